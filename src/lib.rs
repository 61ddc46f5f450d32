//! PostgreSQL service file support through environment variables.
//!
//! Reads the `PGSERVICE` section of `PGSERVICEFILE` (default
//! `~/.pg_service.conf`) and exports its connection parameters as `PGHOST`,
//! `PGPORT`, `PGDATABASE`, `PGUSER`, `PGPASSWORD`, `PGSSLMODE`, `PGSSLCERT`,
//! `PGSSLKEY` and `PGSSLROOTCERT`, so clients that only understand the plain
//! `PG*` variables can connect to a named service. Variables that are already
//! set are never overwritten. `PGSERVICE` and `PGSERVICEFILE` are removed
//! afterwards, since such clients reject them.
//!
//! See <https://www.postgresql.org/docs/current/libpq-pgservice.html>.
//!
//! ```no_run
//! // early in main, before any connection is made
//! pgservice_env::apply(Some("prod"), None)?;
//! # Ok::<(), pgservice_env::ApplicationError>(())
//! ```
//!
//! Calls that touch the process environment are not synchronized; run them
//! before spawning threads that read or write the same variables.

use std::path::Path;
use std::sync::Arc;

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::services::{ApplyReport, ServiceFileService};
pub use application::{ApplicationError, ApplicationResult};
pub use domain::{ConnectionParam, DomainError, ServiceIdentity, ServiceParams};

use infrastructure::traits::{ProcessEnvironment, RealFileSystem};

fn process_service() -> ServiceFileService {
    ServiceFileService::new(Arc::new(RealFileSystem), Arc::new(ProcessEnvironment))
}

/// Apply a service to the process environment.
///
/// `service` and `file` are defaults; `PGSERVICE` and `PGSERVICEFILE` take
/// precedence when set. Both control variables are unset afterwards, also
/// when the lookup fails.
pub fn apply(service: Option<&str>, file: Option<&Path>) -> ApplicationResult<ApplyReport> {
    process_service().apply(service, file)
}

/// Apply the service named by `PGSERVICE` from `PGSERVICEFILE`.
pub fn apply_from_env() -> ApplicationResult<ApplyReport> {
    apply(None, None)
}

/// Read the recognized parameters of a service without touching the environment.
pub fn read(service: Option<&str>, file: Option<&Path>) -> ApplicationResult<ServiceParams> {
    process_service().read(service, file)
}
