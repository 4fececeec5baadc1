//! Logs command - view the audit trail.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use wikidoc_core::{AuditRepository, DocumentApi, DocumentId, DocumentRepository, LogQuery};

use super::write_json;
use crate::{Config, OutputFormat};

/// Arguments for the logs command.
#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Number of entries to show; `0` shows all.
    #[arg(long, short = 'n', default_value_t = 200)]
    pub limit: u32,

    /// Only show entries for one document.
    #[arg(long)]
    pub doc: Option<DocumentId>,
}

impl LogsArgs {
    fn query(&self) -> LogQuery {
        LogQuery {
            doc_id: self.doc,
            limit: (self.limit > 0).then_some(self.limit),
            ..LogQuery::default()
        }
    }
}

/// Execute the logs command.
///
/// # Errors
///
/// Returns an error if the audit log cannot be read.
pub fn execute<D, A, W>(
    args: &LogsArgs,
    api: &DocumentApi<D, A>,
    config: &Config,
    out: &mut W,
) -> Result<()>
where
    D: DocumentRepository,
    A: AuditRepository,
    W: Write,
{
    let entries = api.list_logs(&args.query())?;

    match config.format {
        OutputFormat::Json => write_json(out, &entries),
        OutputFormat::Text => {
            if entries.is_empty() {
                writeln!(out, "No log entries")?;
            }
            for entry in &entries {
                writeln!(
                    out,
                    "{}\t{}\t{}\t#{}\t{}",
                    entry.timestamp,
                    entry.actor,
                    entry.action,
                    entry.doc_id,
                    entry.title.as_deref().unwrap_or("-")
                )?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs_args_parsing() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            args: LogsArgs,
        }

        let default = TestCli::try_parse_from(["test"]).unwrap();
        assert_eq!(default.args.limit, 200);
        assert_eq!(default.args.query().limit, Some(200));
        assert_eq!(default.args.query().doc_id, None);

        let cli = TestCli::try_parse_from(["test", "-n", "0", "--doc", "5"]).unwrap();
        assert_eq!(cli.args.query().limit, None);
        assert_eq!(cli.args.query().doc_id, Some(5));
    }
}
