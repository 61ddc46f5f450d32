//! Configuration management with layered loading
//!
//! Settings only supply caller defaults; `PGSERVICE` and `PGSERVICEFILE`
//! still override them at resolution time.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (nothing set)
//! 2. Global config: `$XDG_CONFIG_HOME/pgservice/pgservice.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `PGSERVICE_ENV_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Prefix of environment variables overriding settings.
pub const ENV_PREFIX: &str = "PGSERVICE_ENV";

/// Unified configuration for pgservice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Service name used when `PGSERVICE` is not set
    pub service: Option<String>,
    /// Service file used when `PGSERVICEFILE` is not set
    pub service_file: Option<PathBuf>,
}

/// Get the XDG config directory for pgservice.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pgservice").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pgservice.toml"))
}

/// Load a TOML file into Settings for manual merging.
fn load_file(path: &Path) -> Result<Settings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(file) = &self.service_file {
            let expanded = expand_env_vars(file.to_string_lossy().as_ref());
            self.service_file = Some(PathBuf::from(expanded));
        }
    }

    /// Merge overlay onto self: overlay wins where set.
    fn merge_with(&self, overlay: &Settings) -> Self {
        Self {
            service: overlay.service.clone().or_else(|| self.service.clone()),
            service_file: overlay
                .service_file
                .clone()
                .or_else(|| self.service_file.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// A missing global file is skipped; a missing explicit file is an error.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_file(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            current = current.merge_with(&load_file(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply `PGSERVICE_ENV_*` environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("service") {
            settings.service = Some(val);
        }
        if let Ok(val) = config.get_string("service_file") {
            settings.service_file = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# pgservice configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/pgservice/pgservice.toml
#   Explicit: pgservice --config <file>
#   Env:      PGSERVICE_ENV_* environment variables
#
# These are defaults only: PGSERVICE and PGSERVICEFILE always win.

# Service (section name) to use when PGSERVICE is unset
# service = "prod"

# Service file to use when PGSERVICEFILE is unset (default: ~/.pg_service.conf)
# service_file = "~/.pg_service.conf"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
