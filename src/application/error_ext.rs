//! Error conversion helpers for service file loading
//!
//! Provides extension traits for cleaner error handling with path context.

use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting load failures to `ApplicationResult` with path context.
pub trait LoadResultExt<T> {
    /// Attach the attempted service file path to a read or parse error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&path).with_load_context(&path)?;
    /// ```
    fn with_load_context(self, path: &Path) -> ApplicationResult<T>;
}

impl<T, E> LoadResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_load_context(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::FileLoad {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }
}
