//! Runner configuration stored in `.seqmig/config.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::MigrationError;
use crate::history::DEFAULT_STORE_NAME;

/// Environment variable that force-disables migrations when truthy.
pub const DISABLED_ENV_VAR: &str = "SEQMIG_DISABLED";

/// Configuration stored in .seqmig/config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeqmigConfig {
    #[serde(default)]
    pub migrations: MigrationSettings,
    #[serde(default)]
    pub redis: RedisSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Skip every run without touching the store.
    #[serde(default)]
    pub disabled: bool,
    /// Key of the execution log document.
    #[serde(default = "default_store_name")]
    pub store_name: String,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            disabled: false,
            store_name: default_store_name(),
        }
    }
}

fn default_store_name() -> String {
    DEFAULT_STORE_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisSettings {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Prefix of content document keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_redis_url() -> String {
    "${REDIS_URL}".to_string()
}

fn default_key_prefix() -> String {
    "seqmig".to_string()
}

impl SeqmigConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, MigrationError> {
        toml::from_str(content).map_err(|err| MigrationError::Config {
            message: format!("failed to parse config: {err}"),
        })
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    /// Environment overrides are applied in both cases.
    pub fn load(path: &Path) -> Result<Self, MigrationError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|err| MigrationError::Config {
                message: format!("failed to read {}: {err}", path.display()),
            })?;
            Self::from_toml_str(&content)?
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, MigrationError> {
        toml::to_string_pretty(self).map_err(|err| MigrationError::Config {
            message: format!("failed to serialize config: {err}"),
        })
    }

    /// Apply `SEQMIG_DISABLED`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(DISABLED_ENV_VAR) {
            self.migrations.disabled = parse_flag(&value);
        }
    }

    /// The Redis URL, expanding a `${VAR}` value from the environment.
    pub fn redis_url(&self) -> Result<String, MigrationError> {
        expand_env(&self.redis.url)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn expand_env(value: &str) -> Result<String, MigrationError> {
    match value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).map_err(|_| MigrationError::Config {
            message: format!("environment variable {var_name} not set"),
        }),
        None => Ok(value.to_string()),
    }
}
