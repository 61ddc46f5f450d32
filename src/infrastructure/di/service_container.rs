//! Service container for dependency injection
//!
//! Wires up services with their dependencies.

use std::sync::Arc;

use crate::application::services::ServiceFileService;
use crate::config::Settings;
use crate::infrastructure::traits::{Environment, FileSystem, ProcessEnvironment, RealFileSystem};

/// Container holding settings and I/O capabilities.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Environment abstraction
    pub env: Arc<dyn Environment>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(ProcessEnvironment),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        env: Arc<dyn Environment>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs, env }
    }

    /// Service file service bound to this container's capabilities.
    pub fn service_file_service(&self) -> ServiceFileService {
        ServiceFileService::new(self.fs.clone(), self.env.clone())
    }

    /// Same service, bound to a different environment (e.g. a dry-run snapshot).
    pub fn service_file_service_with_env(&self, env: Arc<dyn Environment>) -> ServiceFileService {
        ServiceFileService::new(self.fs.clone(), env)
    }
}
