//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve the database path, storage key and logging settings.
//!
//! # Invariants
//! - Blank environment values count as unset.
//! - The storage key encodes the document schema generation; changing it
//!   starts from defaults instead of reading older saves.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Storage slot key for the current document schema.
pub const STORAGE_KEY: &str = "skillhunter.v3";
/// Default SQLite file name placed in the temp directory.
pub const DEFAULT_DB_FILE_NAME: &str = "skillhunter.sqlite3";

pub const ENV_DB_PATH: &str = "SKILLHUNTER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "SKILLHUNTER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SKILLHUNTER_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub storage_key: String,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            storage_key: STORAGE_KEY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads `SKILLHUNTER_*` variables on top of the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL, STORAGE_KEY};
    use std::path::PathBuf;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = StoreConfig::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.storage_key, STORAGE_KEY);
    }

    #[test]
    fn values_are_trimmed_and_applied() {
        let config = StoreConfig::from_lookup(|name| match name {
            ENV_DB_PATH => Some(" /data/portfolio.db ".to_string()),
            ENV_LOG_LEVEL => Some("warn".to_string()),
            ENV_LOG_DIR => Some("/var/log/skillhunter".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, PathBuf::from("/data/portfolio.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/skillhunter")));
    }
}
