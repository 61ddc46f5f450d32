//! Domain entities: connection parameters and service identity

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Environment variable naming the service to look up.
pub const PGSERVICE: &str = "PGSERVICE";

/// Environment variable naming the service file to load.
pub const PGSERVICEFILE: &str = "PGSERVICEFILE";

/// Control variables cleared after every apply.
pub const CONTROL_VARS: [&str; 2] = [PGSERVICE, PGSERVICEFILE];

/// Default service file location, relative to `$HOME`.
pub const DEFAULT_SERVICE_FILE: &str = "${HOME}/.pg_service.conf";

/// Resolved parameters of one service section, keyed by service-file key.
pub type ServiceParams = BTreeMap<String, String>;

/// Connection parameter recognized in a service section.
///
/// Each parameter maps a service-file key onto the libpq environment
/// variable that carries it. Nothing outside this set is ever read from the
/// file or written to the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConnectionParam {
    Host,
    Port,
    DbName,
    User,
    Password,
    SslMode,
    SslCert,
    SslKey,
    SslRootCert,
}

impl ConnectionParam {
    /// All recognized parameters.
    pub const ALL: [ConnectionParam; 9] = [
        ConnectionParam::Host,
        ConnectionParam::Port,
        ConnectionParam::DbName,
        ConnectionParam::User,
        ConnectionParam::Password,
        ConnectionParam::SslMode,
        ConnectionParam::SslCert,
        ConnectionParam::SslKey,
        ConnectionParam::SslRootCert,
    ];

    /// Key as written in the service file.
    pub fn key(self) -> &'static str {
        match self {
            ConnectionParam::Host => "host",
            ConnectionParam::Port => "port",
            ConnectionParam::DbName => "dbname",
            ConnectionParam::User => "user",
            ConnectionParam::Password => "password",
            ConnectionParam::SslMode => "sslmode",
            ConnectionParam::SslCert => "sslcert",
            ConnectionParam::SslKey => "sslkey",
            ConnectionParam::SslRootCert => "sslrootcert",
        }
    }

    /// Target environment variable.
    pub fn env_var(self) -> &'static str {
        match self {
            ConnectionParam::Host => "PGHOST",
            ConnectionParam::Port => "PGPORT",
            ConnectionParam::DbName => "PGDATABASE",
            ConnectionParam::User => "PGUSER",
            ConnectionParam::Password => "PGPASSWORD",
            ConnectionParam::SslMode => "PGSSLMODE",
            ConnectionParam::SslCert => "PGSSLCERT",
            ConnectionParam::SslKey => "PGSSLKEY",
            ConnectionParam::SslRootCert => "PGSSLROOTCERT",
        }
    }

    /// Look up a parameter by its exact (case-sensitive) service-file key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

impl fmt::Display for ConnectionParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Service name and file path resolved for a single lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    /// Section name in the service file
    pub service: String,
    /// Service file to load
    pub file: PathBuf,
}

impl ServiceIdentity {
    pub fn new(service: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            service: service.into(),
            file: file.into(),
        }
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] in {}", self.service, self.file.display())
    }
}

/// Expand `~`, `$VAR` and `${VAR}` using the process environment.
///
/// Returns the input unchanged if expansion fails.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Expand `$VAR` and `${VAR}` through a lookup function.
///
/// Unknown variables expand to the empty string.
pub fn expand_with<F>(input: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    shellexpand::env_with_context_no_errors(input, |name| Some(lookup(name).unwrap_or_default()))
        .into_owned()
}
