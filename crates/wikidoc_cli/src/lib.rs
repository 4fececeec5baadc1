//! # wikidoc_cli
//!
//! Command-line front-end for the WikiDoc document store.
//!
//! ## Commands
//!
//! - `wikidoc list` - List documents
//! - `wikidoc get` - Show one document
//! - `wikidoc create` / `update` / `delete` - Audited mutations
//! - `wikidoc logs` - Show the audit log, newest first
//! - `wikidoc tree` - Print the document forest as an outline
//!
//! ## Configuration
//!
//! Settings come from the environment (a `.env` file is honored) and can be
//! overridden with flags:
//!
//! - `WIKIDOC_DB_PATH` - SQLite file (default: `wikidoc.sqlite3`)
//! - `WIKIDOC_ACTOR` - Identity recorded in the audit log
//! - `WIKIDOC_LOG_LEVEL` - `trace|debug|info|warn|error` (default: `warn`)
//! - `WIKIDOC_LOG_DIR` - Absolute directory for rotating log files

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wikidoc_core::config::ENV_LOG_LEVEL;
use wikidoc_core::{
    AuditError, ConfigError, CoreConfig, DocumentError, ErrorKind, RequestContext,
};

/// Log level used when neither `WIKIDOC_LOG_LEVEL` nor `--log-level` is set.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Resolves the environment configuration with the CLI's quieter log default.
///
/// # Errors
///
/// Returns an error for an invalid `WIKIDOC_*` value.
pub fn base_config<F>(lookup: F) -> Result<CoreConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    CoreConfig::from_lookup(|key| {
        let value = lookup(key);
        if key != ENV_LOG_LEVEL {
            return value;
        }
        value
            .filter(|level| !level.trim().is_empty())
            .or_else(|| Some(DEFAULT_LOG_LEVEL.to_string()))
    })
}

/// WikiDoc CLI - hierarchical documents with an audit trail.
#[derive(Debug, Parser)]
#[command(name = "wikidoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Identity recorded for mutations.
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Directory for rotating log files; stderr when omitted.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Applies flag overrides on top of the environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown log level or a relative log directory.
    pub fn config(&self, base: CoreConfig) -> Result<Config, ConfigError> {
        let mut core = base;
        if let Some(db) = &self.db {
            core = core.with_db_path(db.clone());
        }
        if let Some(level) = &self.log_level {
            core = core.with_log_level(level)?;
        }
        if let Some(log_dir) = &self.log_dir {
            core = core.with_log_dir(log_dir.clone())?;
        }
        if let Some(actor) = &self.actor {
            core = core.with_actor(actor);
        }
        Ok(Config {
            core,
            format: self.format,
        })
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List documents.
    List(commands::documents::ListArgs),
    /// Show one document.
    Get(commands::documents::GetArgs),
    /// Create a document.
    Create(commands::documents::CreateArgs),
    /// Replace title, content and parent of a document.
    Update(commands::documents::UpdateArgs),
    /// Delete a document. Children become roots.
    Delete(commands::documents::DeleteArgs),
    /// Show audit log entries, newest first.
    Logs(commands::logs::LogsArgs),
    /// Print the document forest.
    Tree,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Effective CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Resolved core settings.
    pub core: CoreConfig,
    /// Output format.
    pub format: OutputFormat,
}

impl Config {
    /// Per-invocation request context carrying the configured actor.
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        RequestContext {
            actor: self.core.actor.clone(),
        }
    }
}

/// Maps a failure to the process exit code.
///
/// `2` validation, `3` not found, `4` cycle, `5` storage or anything else.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let kind = err.chain().find_map(|cause| {
        if let Some(err) = cause.downcast_ref::<DocumentError>() {
            Some(err.kind())
        } else if let Some(err) = cause.downcast_ref::<AuditError>() {
            Some(err.kind())
        } else if cause.downcast_ref::<ConfigError>().is_some() {
            Some(ErrorKind::Validation)
        } else {
            None
        }
    });

    match kind {
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Cycle) => 4,
        Some(ErrorKind::Storage) | None => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use wikidoc_core::ValidationError;

    #[test]
    fn test_cli_config_from_flags() {
        let cli = Cli::try_parse_from([
            "wikidoc",
            "--db",
            "notes.sqlite3",
            "--actor",
            "kim@example.com",
            "--format",
            "json",
            "--log-level",
            "WARN",
            "list",
        ])
        .unwrap();

        let config = cli.config(CoreConfig::default()).unwrap();
        assert_eq!(config.core.db_path, PathBuf::from("notes.sqlite3"));
        assert_eq!(config.core.actor.as_str(), "kim@example.com");
        assert_eq!(config.core.log_level, "warn");
        assert_eq!(config.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_flags_fall_back_to_base_config() {
        let cli = Cli::try_parse_from(["wikidoc", "tree"]).unwrap();
        let base = CoreConfig::default().with_actor("env@example.com");

        let config = cli.config(base.clone()).unwrap();
        assert_eq!(config.core, base);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.request_context().actor.as_str(), "env@example.com");
    }

    #[test]
    fn test_global_flags_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["wikidoc", "get", "7", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_log_level_defaults_to_warn() {
        let config = base_config(|_| None).unwrap();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);

        let blank = base_config(|key| (key == ENV_LOG_LEVEL).then(|| "  ".to_string())).unwrap();
        assert_eq!(blank.log_level, "warn");

        let from_env =
            base_config(|key| (key == ENV_LOG_LEVEL).then(|| "debug".to_string())).unwrap();
        assert_eq!(from_env.log_level, "debug");

        let cli = Cli::try_parse_from(["wikidoc", "--log-level", "info", "tree"]).unwrap();
        assert_eq!(cli.config(config).unwrap().core.log_level, "info");
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let cli = Cli::try_parse_from(["wikidoc", "--log-level", "loud", "tree"]).unwrap();
        assert!(cli.config(CoreConfig::default()).is_err());
    }

    #[test]
    fn test_exit_code_follows_error_kind() {
        let validation = anyhow::Error::new(DocumentError::from(ValidationError::EmptyTitle));
        assert_eq!(exit_code(&validation), 2);

        let not_found: anyhow::Result<()> =
            Err(DocumentError::NotFound(4)).context("failed to load document 4");
        assert_eq!(exit_code(&not_found.unwrap_err()), 3);

        let cycle = anyhow::Error::new(DocumentError::Cycle {
            doc_id: 1,
            parent_id: 2,
        });
        assert_eq!(exit_code(&cycle), 4);

        assert_eq!(exit_code(&anyhow::anyhow!("disk on fire")), 5);
    }
}
