//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Process environment abstraction.
///
/// The process environment is shared mutable state; routing every access
/// through this trait lets resolution and application run against an
/// in-memory map in tests.
pub trait Environment: Send + Sync {
    /// Get a variable value. Returns None if unset or not valid UTF-8.
    fn get(&self, name: &str) -> Option<String>;

    /// Check whether a variable is present, whatever its value.
    fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a variable.
    fn set(&self, name: &str, value: &str);

    /// Remove a variable.
    fn unset(&self, name: &str);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Real process environment.
///
/// Concurrent writers from other threads are not coordinated.
#[derive(Debug, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn is_set(&self, name: &str) -> bool {
        std::env::var_os(name).is_some()
    }

    fn set(&self, name: &str, value: &str) {
        std::env::set_var(name, value);
    }

    fn unset(&self, name: &str) {
        std::env::remove_var(name);
    }
}

/// In-memory environment.
///
/// Used in tests and as a detached snapshot of the process environment for
/// dry runs.
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    vars: Mutex<BTreeMap<String, String>>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment (UTF-8 entries only).
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Builder-style seeding, mostly for tests.
    pub fn with_var(self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    /// Copy of all variables.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // single insert/remove per lock: the map is consistent even if poisoned
        self.vars.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FromIterator<(String, String)> for MemoryEnvironment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: Mutex::new(iter.into_iter().collect()),
        }
    }
}

impl Environment for MemoryEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.lock().insert(name.to_string(), value.to_string());
    }

    fn unset(&self, name: &str) {
        self.lock().remove(name);
    }
}
