//! Document commands - read, mutate and outline documents.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use wikidoc_core::{
    flatten_forest, outline, Action, Audited, AuditRepository, Document, DocumentApi, DocumentId,
    DocumentOrder, DocumentRepository, LogEntry,
};

use super::write_json;
use crate::{Config, OutputFormat};

/// Value of `--content` that reads the body from stdin.
const STDIN_MARKER: &str = "-";

/// Arguments for the list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Ordering: `created_asc` or `id_desc`.
    #[arg(long, default_value = "created_asc")]
    pub order: DocumentOrder,
}

/// Arguments for the get command.
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Document id.
    pub id: DocumentId,
}

/// Arguments for the create command.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Document title.
    #[arg(long)]
    pub title: String,

    /// Document body; `-` reads it from stdin.
    #[arg(long)]
    pub content: String,

    /// Parent document id.
    #[arg(long)]
    pub parent: Option<DocumentId>,
}

/// Arguments for the update command.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Document id.
    pub id: DocumentId,

    /// New title.
    #[arg(long)]
    pub title: String,

    /// New body; `-` reads it from stdin.
    #[arg(long)]
    pub content: String,

    /// New parent id. Omit to move the document to root.
    #[arg(long)]
    pub parent: Option<DocumentId>,
}

/// Arguments for the delete command.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Document id.
    pub id: DocumentId,
}

#[derive(Serialize)]
struct MutationReport<'a> {
    action: Action,
    document: &'a Document,
    audit: AuditReport<'a>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AuditReport<'a> {
    Recorded { entry: &'a LogEntry },
    Degraded { error: String },
}

pub(crate) fn list<D, A, W>(
    args: &ListArgs,
    api: &DocumentApi<D, A>,
    config: &Config,
    out: &mut W,
) -> Result<()>
where
    D: DocumentRepository,
    A: AuditRepository,
    W: Write,
{
    let documents = api.list_documents(args.order)?;

    match config.format {
        OutputFormat::Json => write_json(out, &documents),
        OutputFormat::Text => {
            if documents.is_empty() {
                writeln!(out, "No documents")?;
            }
            for document in &documents {
                match document.parent_id {
                    Some(parent_id) => writeln!(
                        out,
                        "#{} {} (parent #{parent_id})",
                        document.id, document.title
                    )?,
                    None => writeln!(out, "#{} {}", document.id, document.title)?,
                }
            }
            Ok(())
        }
    }
}

pub(crate) fn get<D, A, W>(
    args: &GetArgs,
    api: &DocumentApi<D, A>,
    config: &Config,
    out: &mut W,
) -> Result<()>
where
    D: DocumentRepository,
    A: AuditRepository,
    W: Write,
{
    let document = api.get_document(args.id)?;

    match config.format {
        OutputFormat::Json => write_json(out, &document),
        OutputFormat::Text => {
            writeln!(out, "#{} {}", document.id, document.title)?;
            match document.parent_id {
                Some(parent_id) => writeln!(out, "parent: #{parent_id}")?,
                None => writeln!(out, "parent: -")?,
            }
            writeln!(out, "created_at: {}", document.created_at)?;
            writeln!(out)?;
            writeln!(out, "{}", document.content.trim_end())?;
            Ok(())
        }
    }
}

pub(crate) fn create<D, A, W>(
    args: CreateArgs,
    api: &DocumentApi<D, A>,
    config: &Config,
    out: &mut W,
) -> Result<()>
where
    D: DocumentRepository,
    A: AuditRepository,
    W: Write,
{
    let content = resolve_content(args.content)?;
    let audited =
        api.create_document(&config.request_context(), args.title, content, args.parent)?;
    report_mutation(Action::Create, &audited, config, out)
}

pub(crate) fn update<D, A, W>(
    args: UpdateArgs,
    api: &DocumentApi<D, A>,
    config: &Config,
    out: &mut W,
) -> Result<()>
where
    D: DocumentRepository,
    A: AuditRepository,
    W: Write,
{
    let content = resolve_content(args.content)?;
    let audited = api.update_document(
        &config.request_context(),
        args.id,
        args.title,
        content,
        args.parent,
    )?;
    report_mutation(Action::Update, &audited, config, out)
}

pub(crate) fn delete<D, A, W>(
    args: &DeleteArgs,
    api: &DocumentApi<D, A>,
    config: &Config,
    out: &mut W,
) -> Result<()>
where
    D: DocumentRepository,
    A: AuditRepository,
    W: Write,
{
    let audited = api.delete_document(&config.request_context(), args.id)?;
    report_mutation(Action::Delete, &audited, config, out)
}

pub(crate) fn tree<D, A, W>(api: &DocumentApi<D, A>, config: &Config, out: &mut W) -> Result<()>
where
    D: DocumentRepository,
    A: AuditRepository,
    W: Write,
{
    let forest = api.document_tree()?;

    match config.format {
        OutputFormat::Json => write_json(out, &outline(&forest)),
        OutputFormat::Text => {
            if forest.is_empty() {
                writeln!(out, "No documents")?;
            }
            for (depth, document) in flatten_forest(&forest) {
                writeln!(
                    out,
                    "{}{} (#{})",
                    "  ".repeat(depth),
                    document.title,
                    document.id
                )?;
            }
            Ok(())
        }
    }
}

fn resolve_content(value: String) -> Result<String> {
    if value != STDIN_MARKER {
        return Ok(value);
    }
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("failed to read document content from stdin")?;
    Ok(content)
}

fn report_mutation<W: Write>(
    action: Action,
    audited: &Audited<Document>,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    let document = &audited.value;
    if let Err(err) = &audited.audit {
        eprintln!(
            "warning: {action} of document {} succeeded but its audit entry was not recorded: {err}",
            document.id
        );
    }

    match config.format {
        OutputFormat::Json => {
            let audit = match &audited.audit {
                Ok(entry) => AuditReport::Recorded { entry },
                Err(err) => AuditReport::Degraded {
                    error: err.to_string(),
                },
            };
            write_json(
                out,
                &MutationReport {
                    action,
                    document,
                    audit,
                },
            )
        }
        OutputFormat::Text => {
            let verb = match action {
                Action::Create => "created",
                Action::Update => "updated",
                Action::Delete => "deleted",
            };
            writeln!(out, "{verb} document #{} {}", document.id, document.title)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_args_parsing() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            args: UpdateArgs,
        }

        let cli = TestCli::try_parse_from([
            "test", "12", "--title", "Renamed", "--content", "-", "--parent", "3",
        ])
        .unwrap();
        assert_eq!(cli.args.id, 12);
        assert_eq!(cli.args.title, "Renamed");
        assert_eq!(cli.args.content, STDIN_MARKER);
        assert_eq!(cli.args.parent, Some(3));

        let to_root =
            TestCli::try_parse_from(["test", "12", "--title", "T", "--content", "c"]).unwrap();
        assert_eq!(to_root.args.parent, None);
    }

    #[test]
    fn test_list_order_parsing() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            args: ListArgs,
        }

        let default = TestCli::try_parse_from(["test"]).unwrap();
        assert_eq!(default.args.order, DocumentOrder::CreatedAsc);

        let newest = TestCli::try_parse_from(["test", "--order", "id_desc"]).unwrap();
        assert_eq!(newest.args.order, DocumentOrder::IdDesc);

        assert!(TestCli::try_parse_from(["test", "--order", "alphabetical"]).is_err());
    }

    #[test]
    fn test_inline_content_is_used_verbatim() {
        assert_eq!(resolve_content("body\n".to_string()).unwrap(), "body\n");
    }
}
