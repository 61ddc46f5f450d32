//! Service file resolution service
//!
//! Resolves a PostgreSQL service name and service file, reads the matching
//! section, and projects recognized parameters into the environment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ini::{Ini, ParseOption};
use tracing::{debug, instrument};

use crate::application::{ApplicationResult, LoadResultExt};
use crate::domain::{
    expand_with, ConnectionParam, DomainError, ServiceIdentity, ServiceParams, CONTROL_VARS,
    DEFAULT_SERVICE_FILE, PGSERVICE, PGSERVICEFILE,
};
use crate::infrastructure::traits::{Environment, FileSystem};

/// Outcome of projecting a service section into the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// Service and file the parameters came from
    pub identity: ServiceIdentity,
    /// Variables written, with their values
    pub applied: Vec<(ConnectionParam, String)>,
    /// Parameters found in the section whose variable was already set
    pub kept: Vec<ConnectionParam>,
}

/// Service for resolving and applying PostgreSQL service definitions.
pub struct ServiceFileService {
    fs: Arc<dyn FileSystem>,
    env: Arc<dyn Environment>,
}

impl ServiceFileService {
    /// Create a new service file service.
    pub fn new(fs: Arc<dyn FileSystem>, env: Arc<dyn Environment>) -> Self {
        Self { fs, env }
    }

    /// Resolve the effective service name and file path.
    ///
    /// `PGSERVICE` and `PGSERVICEFILE` override the caller's defaults. Without
    /// any file, `${HOME}/.pg_service.conf` is used. A service name is
    /// required; there is no default.
    pub fn resolve(
        &self,
        service: Option<&str>,
        file: Option<&Path>,
    ) -> ApplicationResult<ServiceIdentity> {
        let service = self
            .env
            .get(PGSERVICE)
            .or_else(|| service.map(str::to_string))
            .ok_or(DomainError::MissingServiceName)?;
        let file = self.resolve_file(file);

        let identity = ServiceIdentity { service, file };
        debug!("resolve: {}", identity);
        Ok(identity)
    }

    /// Resolve only the service file path (`PGSERVICEFILE` > caller > default).
    pub fn resolve_file(&self, file: Option<&Path>) -> PathBuf {
        self.env
            .get(PGSERVICEFILE)
            .map(PathBuf::from)
            .or_else(|| file.map(Path::to_path_buf))
            .unwrap_or_else(|| self.default_service_file())
    }

    /// `${HOME}/.pg_service.conf`, with `HOME` read from the injected environment.
    pub fn default_service_file(&self) -> PathBuf {
        PathBuf::from(expand_with(DEFAULT_SERVICE_FILE, |name| self.env.get(name)))
    }

    /// Resolve, then read the recognized parameters of the service section.
    ///
    /// Does not modify the environment.
    pub fn read(
        &self,
        service: Option<&str>,
        file: Option<&Path>,
    ) -> ApplicationResult<ServiceParams> {
        self.resolve_and_lookup(service, file)
            .map(|(_, params)| params)
    }

    /// Read the recognized parameters of an already resolved service.
    ///
    /// Values are copied verbatim; keys missing from the section are omitted.
    /// An empty result is not an error. Like libpq, only the first block of a
    /// repeated section counts, and the first of a repeated key wins.
    /// Values containing NUL cannot be exported and are rejected.
    pub fn lookup(&self, identity: &ServiceIdentity) -> ApplicationResult<ServiceParams> {
        let ini = self.load(&identity.file)?;
        let section = ini.section(Some(identity.service.as_str())).ok_or_else(|| {
            DomainError::SectionNotFound {
                service: identity.service.clone(),
                path: identity.file.clone(),
            }
        })?;

        let params: ServiceParams = ConnectionParam::ALL
            .iter()
            .filter_map(|param| {
                section
                    .get(param.key())
                    .map(|value| (param.key().to_string(), value.to_string()))
            })
            .collect();

        if let Some(key) = params.iter().find_map(|(k, v)| v.contains('\0').then_some(k)) {
            return Err(DomainError::NulInValue {
                service: identity.service.clone(),
                key: key.clone(),
            }
            .into());
        }

        debug!("lookup: {} recognized parameters in {}", params.len(), identity);
        Ok(params)
    }

    /// Names of all sections in the resolved service file, sorted.
    pub fn list_services(&self, file: Option<&Path>) -> ApplicationResult<Vec<String>> {
        let path = self.resolve_file(file);
        let ini = self.load(&path)?;

        let mut names: Vec<String> = ini.sections().flatten().map(str::to_string).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Resolve, read, and write the service parameters into the environment.
    ///
    /// Variables that are already set, even to an empty string, are left
    /// untouched. `PGSERVICE` and `PGSERVICEFILE` are removed afterwards
    /// whether or not the lookup succeeded. On failure nothing else is written.
    #[instrument(skip(self))]
    pub fn apply(
        &self,
        service: Option<&str>,
        file: Option<&Path>,
    ) -> ApplicationResult<ApplyReport> {
        let outcome = self
            .resolve_and_lookup(service, file)
            .map(|(identity, params)| self.project(identity, params));

        self.clear_control_vars();
        outcome
    }

    fn resolve_and_lookup(
        &self,
        service: Option<&str>,
        file: Option<&Path>,
    ) -> ApplicationResult<(ServiceIdentity, ServiceParams)> {
        let identity = self.resolve(service, file)?;
        let params = self.lookup(&identity)?;
        Ok((identity, params))
    }

    fn project(&self, identity: ServiceIdentity, params: ServiceParams) -> ApplyReport {
        let mut applied = Vec::new();
        let mut kept = Vec::new();

        for (key, value) in params {
            let Some(param) = ConnectionParam::from_key(&key) else {
                continue;
            };
            let var = param.env_var();
            if self.env.is_set(var) {
                debug!("apply: keeping {} (already set)", var);
                kept.push(param);
            } else {
                debug!("apply: setting {}", var);
                self.env.set(var, &value);
                applied.push((param, value));
            }
        }

        ApplyReport {
            identity,
            applied,
            kept,
        }
    }

    fn clear_control_vars(&self) {
        for var in CONTROL_VARS {
            self.env.unset(var);
        }
    }

    fn load(&self, path: &Path) -> ApplicationResult<Ini> {
        debug!("load: {}", path.display());
        let content = self.fs.read_to_string(path).with_load_context(path)?;
        // backslashes are literal in service files (passwords, Windows paths)
        let opt = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        Ini::load_from_str_opt(&content, opt).with_load_context(path)
    }
}
