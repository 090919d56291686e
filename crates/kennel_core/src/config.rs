//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve the database path and logging settings once at startup.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - `log_dir`, when present, is absolute.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "KENNEL_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "KENNEL_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "KENNEL_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "kennel.sqlite3";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{LOG_LEVEL_ENV}: {message}"),
            Self::RelativeLogDir(value) => {
                write!(f, "{LOG_DIR_ENV} must be an absolute path, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KennelConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for KennelConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl KennelConfig {
    /// Reads `KENNEL_DB_PATH`, `KENNEL_LOG_LEVEL` and `KENNEL_LOG_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = value(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = value(LOG_LEVEL_ENV) {
            config.log_level = normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?;
        }
        if let Some(dir) = value(LOG_DIR_ENV) {
            let path = PathBuf::from(&dir);
            if !path.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir));
            }
            config.log_dir = Some(path);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, KennelConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config =
            KennelConfig::from_lookup(lookup(&[(DB_PATH_ENV, "  "), (LOG_DIR_ENV, "")])).unwrap();
        assert_eq!(config, KennelConfig::default());
    }

    #[test]
    fn explicit_values_are_normalized() {
        let dir = std::env::temp_dir().join("kennel-logs");
        let config = KennelConfig::from_lookup(lookup(&[
            (DB_PATH_ENV, "/data/kennel.db"),
            (LOG_LEVEL_ENV, " WARNING "),
            (LOG_DIR_ENV, dir.to_str().unwrap()),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/kennel.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(dir));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = KennelConfig::from_lookup(lookup(&[(LOG_LEVEL_ENV, "loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));

        let err = KennelConfig::from_lookup(lookup(&[(LOG_DIR_ENV, "logs")])).unwrap_err();
        assert_eq!(err, ConfigError::RelativeLogDir("logs".to_string()));
    }
}
