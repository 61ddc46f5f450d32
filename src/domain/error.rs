//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent lookup failures independent of I/O.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("no service name given and {} is not set", crate::domain::PGSERVICE)]
    MissingServiceName,

    #[error("service '{service}' not found in {}", .path.display())]
    SectionNotFound { service: String, path: PathBuf },

    #[error("value of '{key}' in service '{service}' contains a NUL byte")]
    NulInValue { service: String, key: String },
}
