//! Audit log repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append immutable entries to `activity_logs`.
//! - List entries newest first, optionally per document.
//!
//! # Invariants
//! - `timestamp` never goes backwards relative to the previous entry, even
//!   when the wall clock does.
//! - The table itself rejects UPDATE and DELETE.

use super::NOW_EPOCH_MS_SQL;
use crate::db::{ensure_table_ready, DbError, DbResult};
use crate::error::ErrorKind;
use crate::model::document::DocumentId;
use crate::model::log_entry::{Action, Actor, LogEntry, LogOrder, LogQuery};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const LOG_SELECT_SQL: &str = "SELECT
    seq,
    actor,
    action,
    doc_id,
    title,
    timestamp
FROM activity_logs";

const LOG_COLUMNS: &[&str] = &["seq", "actor", "action", "doc_id", "title", "timestamp"];

pub type AuditResult<T> = Result<T, AuditError>;

/// Errors from audit log operations. Every variant is a storage condition.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted audit data: {0}")]
    InvalidData(String),
}

impl AuditError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Storage
    }
}

impl From<rusqlite::Error> for AuditError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the append-only audit log.
pub trait AuditRepository {
    /// Appends one entry and returns it with its assigned sequence and time.
    fn append(
        &self,
        actor: &Actor,
        action: Action,
        doc_id: DocumentId,
        title: Option<&str>,
    ) -> AuditResult<LogEntry>;
    /// Lists entries matching `query`.
    fn list(&self, query: &LogQuery) -> AuditResult<Vec<LogEntry>>;
}

/// SQLite-backed audit repository.
pub struct SqliteAuditRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> DbResult<Self> {
        ensure_table_ready(conn, "activity_logs", LOG_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl AuditRepository for SqliteAuditRepository<'_> {
    fn append(
        &self,
        actor: &Actor,
        action: Action,
        doc_id: DocumentId,
        title: Option<&str>,
    ) -> AuditResult<LogEntry> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            &format!(
                "INSERT INTO activity_logs (actor, action, doc_id, title, timestamp)
                 VALUES (
                    ?1, ?2, ?3, ?4,
                    MAX({NOW_EPOCH_MS_SQL}, COALESCE((SELECT MAX(timestamp) FROM activity_logs), 0))
                 );"
            ),
            params![actor.as_str(), action.as_str(), doc_id, title],
        )?;
        let seq = tx.last_insert_rowid();
        let entry = load_entry(&tx, seq)?;
        tx.commit()?;
        Ok(entry)
    }

    fn list(&self, query: &LogQuery) -> AuditResult<Vec<LogEntry>> {
        let mut sql = format!("{LOG_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(doc_id) = query.doc_id {
            sql.push_str(" AND doc_id = ?");
            bind_values.push(Value::Integer(doc_id));
        }

        match query.order {
            LogOrder::TimeDesc => sql.push_str(" ORDER BY timestamp DESC, seq DESC"),
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_log_row(row)?);
        }
        Ok(entries)
    }
}

fn load_entry(conn: &Connection, seq: i64) -> AuditResult<LogEntry> {
    let mut stmt = conn.prepare(&format!("{LOG_SELECT_SQL} WHERE seq = ?1;"))?;
    let mut rows = stmt.query([seq])?;
    match rows.next()? {
        Some(row) => parse_log_row(row),
        None => Err(AuditError::InvalidData(format!(
            "appended entry {seq} missing on read-back"
        ))),
    }
}

fn parse_log_row(row: &Row<'_>) -> AuditResult<LogEntry> {
    let action_text: String = row.get("action")?;
    let action = action_text.parse::<Action>().map_err(|_| {
        AuditError::InvalidData(format!(
            "invalid action `{action_text}` in activity_logs.action"
        ))
    })?;

    let actor_text: String = row.get("actor")?;
    Ok(LogEntry {
        seq: row.get("seq")?,
        actor: Actor::resolve(Some(actor_text.as_str())),
        action,
        doc_id: row.get("doc_id")?,
        title: row.get("title")?,
        timestamp: row.get("timestamp")?,
    })
}
