//! Runtime configuration resolved from the process environment.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - `log_level` is always a normalized level name.
//! - `log_dir`, when present, is absolute.

use crate::logging::{default_log_level, normalize_level, LoggingError};
use crate::model::log_entry::Actor;
use std::path::PathBuf;

pub const DEFAULT_DB_FILE: &str = "wikidoc.sqlite3";

pub const ENV_DB_PATH: &str = "WIKIDOC_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "WIKIDOC_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "WIKIDOC_LOG_DIR";
pub const ENV_ACTOR: &str = "WIKIDOC_ACTOR";

/// Errors raised while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {source_name}: {source}")]
    InvalidLogLevel {
        source_name: &'static str,
        #[source]
        source: LoggingError,
    },
    #[error("{source_name} must be an absolute path, got `{}`", .value.display())]
    RelativeLogDir {
        source_name: &'static str,
        value: PathBuf,
    },
}

/// Resolved settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
    pub actor: Actor,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            log_level: default_log_level(),
            log_dir: None,
            actor: Actor::unknown(),
        }
    }
}

impl CoreConfig {
    /// Reads `WIKIDOC_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(db_path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = parse_level(&level, ENV_LOG_LEVEL)?;
        }
        if let Some(log_dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(parse_log_dir(PathBuf::from(log_dir), ENV_LOG_DIR)?);
        }
        config.actor = Actor::resolve(read(ENV_ACTOR).as_deref());
        Ok(config)
    }

    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn with_log_level(mut self, level: &str) -> Result<Self, ConfigError> {
        self.log_level = parse_level(level, "--log-level")?;
        Ok(self)
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        self.log_dir = Some(parse_log_dir(log_dir.into(), "--log-dir")?);
        Ok(self)
    }

    /// Replaces the default actor; a blank identity resolves to `unknown`.
    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = Actor::resolve(Some(actor));
        self
    }
}

fn parse_level(value: &str, source_name: &'static str) -> Result<&'static str, ConfigError> {
    normalize_level(value).map_err(|source| ConfigError::InvalidLogLevel {
        source_name,
        source,
    })
}

fn parse_log_dir(value: PathBuf, source_name: &'static str) -> Result<PathBuf, ConfigError> {
    if value.is_absolute() {
        Ok(value)
    } else {
        Err(ConfigError::RelativeLogDir { source_name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, CoreConfig, DEFAULT_DB_FILE, ENV_ACTOR, ENV_DB_PATH, ENV_LOG_DIR,
        ENV_LOG_LEVEL,
    };
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
        assert!(config.actor.is_unknown());
    }

    #[test]
    fn variables_are_read_and_normalized() {
        let log_dir = if cfg!(windows) { "C:\\logs" } else { "/var/log/wikidoc" };
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, " /tmp/wiki.sqlite3 "),
            (ENV_LOG_LEVEL, "WARNING"),
            (ENV_LOG_DIR, log_dir),
            (ENV_ACTOR, "ada@example.com"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/wiki.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from(log_dir)));
        assert_eq!(config.actor.as_str(), "ada@example.com");
    }

    #[test]
    fn blank_variables_count_as_unset() {
        let config =
            CoreConfig::from_lookup(lookup(&[(ENV_DB_PATH, "  "), (ENV_ACTOR, "")])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE));
        assert!(config.actor.is_unknown());
    }

    #[test]
    fn invalid_level_and_relative_log_dir_are_rejected() {
        let level_error = CoreConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "loud")])).unwrap_err();
        assert!(matches!(
            level_error,
            ConfigError::InvalidLogLevel { source_name, .. } if source_name == ENV_LOG_LEVEL
        ));

        let dir_error = CoreConfig::from_lookup(lookup(&[(ENV_LOG_DIR, "logs")])).unwrap_err();
        assert!(dir_error.to_string().contains("must be an absolute path"));
    }

    #[test]
    fn overrides_replace_environment_values() {
        let config = CoreConfig::from_lookup(lookup(&[(ENV_ACTOR, "env@example.com")]))
            .unwrap()
            .with_db_path("other.sqlite3")
            .with_log_level("error")
            .unwrap()
            .with_actor("cli@example.com");

        assert_eq!(config.db_path, PathBuf::from("other.sqlite3"));
        assert_eq!(config.log_level, "error");
        assert_eq!(config.actor.as_str(), "cli@example.com");
        assert!(CoreConfig::default().with_log_dir("relative").is_err());
    }
}
