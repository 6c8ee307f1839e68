//! Core runtime configuration.
//!
//! # Responsibility
//! - Collect database location and logging options in one value.
//! - Load that value from environment variables or a JSON document.
//! - Bootstrap logging and the store from it.
//!
//! # Invariants
//! - Missing `db_path` means a private in-memory database.
//! - Missing `log_dir` means logging is left to the host process.

use crate::db::{DbError, Store};
use crate::logging::{default_log_level, init_logging};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CHORE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CHORE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CHORE_LOG_DIR";

/// Error raised while loading configuration or bootstrapping from it.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Logging(String),
    Db(DbError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid config document: {err}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Logging(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for ConfigError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `CHORE_DB_PATH`, `CHORE_LOG_LEVEL` and `CHORE_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Self {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Starts logging (when a directory is configured) and opens the store.
    pub fn bootstrap(&self) -> Result<Store, ConfigError> {
        if let Some(log_dir) = &self.log_dir {
            init_logging(&self.log_level, &log_dir.to_string_lossy())
                .map_err(ConfigError::Logging)?;
        }

        let store = match &self.db_path {
            Some(path) => Store::open(path)?,
            None => Store::open_in_memory()?,
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_LOG_LEVEL};
    use std::path::PathBuf;

    #[test]
    fn lookup_ignores_blank_values() {
        let config = CoreConfig::from_lookup(|key| match key {
            ENV_DB_PATH => Some("/tmp/chores.sqlite3".to_string()),
            ENV_LOG_LEVEL => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/chores.sqlite3")));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = CoreConfig::from_json_str(r#"{"log_level":"warn"}"#).unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn json_rejects_malformed_documents() {
        assert!(matches!(
            CoreConfig::from_json_str(r#"{"log_level": 5}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(CoreConfig::from_json_str("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn bootstrap_without_paths_opens_in_memory_store() {
        let store = CoreConfig::default().bootstrap().unwrap();
        assert_eq!(store.revision(), 0);
    }
}
