//! Subcommand implementations.
//!
//! Every command writes its result to `out`; warnings about a lost audit
//! entry go to stderr so they never corrupt JSON output.

pub mod documents;
pub mod logs;

use std::io::Write;

use anyhow::Result;
use log::debug;
use serde::Serialize;
use wikidoc_core::{AuditRepository, DocumentApi, DocumentRepository};

use crate::{Commands, Config};

/// Runs one parsed subcommand.
///
/// # Errors
///
/// Returns the underlying core error, so callers can map it to an exit code.
pub fn execute<D, A, W>(
    command: Commands,
    api: &DocumentApi<D, A>,
    config: &Config,
    out: &mut W,
) -> Result<()>
where
    D: DocumentRepository,
    A: AuditRepository,
    W: Write,
{
    let name = command_name(&command);
    debug!("event=cli_command module=cli status=start command={name}");

    let result = match command {
        Commands::List(args) => documents::list(&args, api, config, out),
        Commands::Get(args) => documents::get(&args, api, config, out),
        Commands::Create(args) => documents::create(args, api, config, out),
        Commands::Update(args) => documents::update(args, api, config, out),
        Commands::Delete(args) => documents::delete(&args, api, config, out),
        Commands::Logs(args) => logs::execute(&args, api, config, out),
        Commands::Tree => documents::tree(api, config, out),
    };

    match &result {
        Ok(()) => debug!("event=cli_command module=cli status=ok command={name}"),
        Err(err) => debug!("event=cli_command module=cli status=error command={name} error={err}"),
    }
    result
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::List(_) => "list",
        Commands::Get(_) => "get",
        Commands::Create(_) => "create",
        Commands::Update(_) => "update",
        Commands::Delete(_) => "delete",
        Commands::Logs(_) => "logs",
        Commands::Tree => "tree",
    }
}

fn write_json<T, W>(out: &mut W, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use wikidoc_core::db::open_db_in_memory;
    use wikidoc_core::{CoreConfig, LogQuery};

    use crate::Cli;

    fn run(conn: &rusqlite::Connection, argv: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("wikidoc").chain(argv.iter().copied()))?;
        let config = cli.config(CoreConfig::default())?;
        let api = DocumentApi::sqlite(conn)?;
        let mut out = Vec::new();
        execute(cli.command, &api, &config, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_create_then_tree_prints_outline() {
        let conn = open_db_in_memory().unwrap();
        run(&conn, &["create", "--title", "Handbook", "--content", "root"]).unwrap();
        run(
            &conn,
            &["create", "--title", "Onboarding", "--content", "a", "--parent", "1"],
        )
        .unwrap();
        run(&conn, &["create", "--title", "Glossary", "--content", "b"]).unwrap();

        let outline = run(&conn, &["tree"]).unwrap();
        assert_eq!(
            outline,
            "Handbook (#1)\n  Onboarding (#2)\nGlossary (#3)\n"
        );
    }

    #[test]
    fn test_tree_json_is_a_flat_outline() {
        let conn = open_db_in_memory().unwrap();
        run(&conn, &["create", "--title", "Root", "--content", "r"]).unwrap();
        run(
            &conn,
            &["create", "--title", "Leaf", "--content", "l", "--parent", "1"],
        )
        .unwrap();

        let printed = run(&conn, &["--format", "json", "tree"]).unwrap();
        let entries: serde_json::Value = serde_json::from_str(&printed).unwrap();
        assert_eq!(entries.as_array().unwrap().len(), 2);
        assert_eq!(entries[1]["depth"], 1);
        assert_eq!(entries[1]["document"]["title"], "Leaf");
    }

    #[test]
    fn test_mutations_record_configured_actor() {
        let conn = open_db_in_memory().unwrap();
        run(
            &conn,
            &["--actor", "lee@example.com", "create", "--title", "T", "--content", "c"],
        )
        .unwrap();
        run(
            &conn,
            &["update", "1", "--title", "T2", "--content", "c2"],
        )
        .unwrap();

        let api = DocumentApi::sqlite(&conn).unwrap();
        let entries = api.list_logs(&LogQuery::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].actor.is_unknown());
        assert_eq!(entries[1].actor.as_str(), "lee@example.com");
    }

    #[test]
    fn test_json_output_is_machine_readable() {
        let conn = open_db_in_memory().unwrap();
        let created = run(
            &conn,
            &["--format", "json", "create", "--title", "Doc", "--content", "body"],
        )
        .unwrap();
        let report: serde_json::Value = serde_json::from_str(&created).unwrap();
        assert_eq!(report["action"], "create");
        assert_eq!(report["document"]["id"], 1);
        assert_eq!(report["audit"]["status"], "recorded");
        assert_eq!(report["audit"]["entry"]["doc_id"], 1);

        let listed = run(&conn, &["--format", "json", "list"]).unwrap();
        let documents: serde_json::Value = serde_json::from_str(&listed).unwrap();
        assert_eq!(documents.as_array().unwrap().len(), 1);
        assert_eq!(documents[0]["title"], "Doc");
    }

    #[test]
    fn test_failures_keep_their_error_kind() {
        let conn = open_db_in_memory().unwrap();
        run(&conn, &["create", "--title", "A", "--content", "x"]).unwrap();

        let err = run(&conn, &["get", "9"]).unwrap_err();
        assert_eq!(crate::exit_code(&err), 3);

        let err = run(
            &conn,
            &["update", "1", "--title", "A", "--content", "x", "--parent", "1"],
        )
        .unwrap_err();
        assert_eq!(crate::exit_code(&err), 4);

        let err = run(&conn, &["create", "--title", " ", "--content", "x"]).unwrap_err();
        assert_eq!(crate::exit_code(&err), 2);
    }
}
