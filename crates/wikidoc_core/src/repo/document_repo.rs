//! Document repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD persistence over the `documents` table.
//! - Enforce parent existence and acyclicity at write time.
//!
//! # Invariants
//! - Writes only accept a validated `DocumentDraft`.
//! - `created_asc` listing is `created_at ASC, id ASC`; `id_desc` is `id DESC`.
//! - Delete never cascades; children keep their dangling `parent_id`.

use super::NOW_EPOCH_MS_SQL;
use crate::db::{ensure_table_ready, DbError, DbResult};
use crate::error::ErrorKind;
use crate::model::document::{Document, DocumentDraft, DocumentId, DocumentOrder, ValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashSet;

const DOCUMENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    parent_id,
    created_at
FROM documents";

const DOCUMENT_COLUMNS: &[&str] = &["id", "title", "content", "parent_id", "created_at"];

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("document not found: {0}")]
    NotFound(DocumentId),
    #[error("parent document not found: {0}")]
    ParentNotFound(DocumentId),
    #[error("moving document {doc_id} under {parent_id} would create a cycle")]
    Cycle {
        doc_id: DocumentId,
        parent_id: DocumentId,
    },
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted document data: {0}")]
    InvalidData(String),
}

impl DocumentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) | Self::ParentNotFound(_) => ErrorKind::NotFound,
            Self::Cycle { .. } => ErrorKind::Cycle,
            Self::Db(_) | Self::InvalidData(_) => ErrorKind::Storage,
        }
    }
}

impl From<rusqlite::Error> for DocumentError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for document persistence.
pub trait DocumentRepository {
    /// Inserts one document and returns it with its assigned id and timestamp.
    fn create_document(&self, draft: &DocumentDraft) -> DocumentResult<Document>;
    /// Loads one document by id.
    fn get_document(&self, id: DocumentId) -> DocumentResult<Option<Document>>;
    /// Lists every document in the requested order.
    fn list_documents(&self, order: DocumentOrder) -> DocumentResult<Vec<Document>>;
    /// Lists direct children of one document in `created_asc` order.
    fn list_children(&self, parent_id: DocumentId) -> DocumentResult<Vec<Document>>;
    /// Replaces title, content and parent of one document.
    fn update_document(&self, id: DocumentId, draft: &DocumentDraft)
        -> DocumentResult<Document>;
    /// Hard-deletes one document and returns the removed record.
    fn delete_document(&self, id: DocumentId) -> DocumentResult<Document>;
}

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> DbResult<Self> {
        ensure_table_ready(conn, "documents", DOCUMENT_COLUMNS)?;
        Ok(Self { conn })
    }

    fn begin(&self) -> DocumentResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn create_document(&self, draft: &DocumentDraft) -> DocumentResult<Document> {
        let tx = self.begin()?;
        if let Some(parent_id) = draft.parent_id() {
            if !document_exists(&tx, parent_id)? {
                return Err(DocumentError::ParentNotFound(parent_id));
            }
        }

        tx.execute(
            &format!(
                "INSERT INTO documents (title, content, parent_id, created_at)
                 VALUES (?1, ?2, ?3, {NOW_EPOCH_MS_SQL});"
            ),
            params![draft.title(), draft.content(), draft.parent_id()],
        )?;
        let id = tx.last_insert_rowid();
        let document = load_document(&tx, id)?.ok_or_else(|| {
            DocumentError::InvalidData(format!("inserted document {id} missing on read-back"))
        })?;

        tx.commit()?;
        Ok(document)
    }

    fn get_document(&self, id: DocumentId) -> DocumentResult<Option<Document>> {
        load_document(self.conn, id)
    }

    fn list_documents(&self, order: DocumentOrder) -> DocumentResult<Vec<Document>> {
        let order_by = match order {
            DocumentOrder::CreatedAsc => "created_at ASC, id ASC",
            DocumentOrder::IdDesc => "id DESC",
        };
        let mut stmt = self
            .conn
            .prepare(&format!("{DOCUMENT_SELECT_SQL} ORDER BY {order_by};"))?;
        let mut rows = stmt.query([])?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }
        Ok(documents)
    }

    fn list_children(&self, parent_id: DocumentId) -> DocumentResult<Vec<Document>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DOCUMENT_SELECT_SQL}
             WHERE parent_id = ?1
             ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([parent_id])?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }
        Ok(documents)
    }

    fn update_document(
        &self,
        id: DocumentId,
        draft: &DocumentDraft,
    ) -> DocumentResult<Document> {
        let tx = self.begin()?;
        let current = load_document(&tx, id)?.ok_or(DocumentError::NotFound(id))?;

        if let Some(parent_id) = draft.parent_id() {
            if !document_exists(&tx, parent_id)? {
                return Err(DocumentError::ParentNotFound(parent_id));
            }
            ensure_no_cycle(&tx, id, parent_id)?;
        }

        tx.execute(
            "UPDATE documents
             SET title = ?2,
                 content = ?3,
                 parent_id = ?4
             WHERE id = ?1;",
            params![id, draft.title(), draft.content(), draft.parent_id()],
        )?;
        tx.commit()?;

        Ok(Document {
            title: draft.title().to_string(),
            content: draft.content().to_string(),
            parent_id: draft.parent_id(),
            ..current
        })
    }

    fn delete_document(&self, id: DocumentId) -> DocumentResult<Document> {
        let tx = self.begin()?;
        let document = load_document(&tx, id)?.ok_or(DocumentError::NotFound(id))?;
        tx.execute("DELETE FROM documents WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(document)
    }
}

fn load_document(conn: &Connection, id: DocumentId) -> DocumentResult<Option<Document>> {
    let mut stmt = conn.prepare(&format!("{DOCUMENT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_document_row(row)?));
    }
    Ok(None)
}

fn document_exists(conn: &Connection, id: DocumentId) -> DocumentResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM documents WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Walks the ancestor chain of `candidate_parent` and rejects the move when
/// `doc_id` appears on it. A chain that reaches a missing id ends there, the
/// same way readers treat a dangling parent as a root.
fn ensure_no_cycle(
    conn: &Connection,
    doc_id: DocumentId,
    candidate_parent: DocumentId,
) -> DocumentResult<()> {
    let cycle = DocumentError::Cycle {
        doc_id,
        parent_id: candidate_parent,
    };
    let mut visited = HashSet::new();
    let mut cursor = Some(candidate_parent);
    while let Some(current) = cursor {
        if current == doc_id || !visited.insert(current) {
            return Err(cycle);
        }

        let parent: Option<Option<DocumentId>> = conn
            .query_row(
                "SELECT parent_id FROM documents WHERE id = ?1;",
                [current],
                |row| row.get(0),
            )
            .optional()?;
        cursor = parent.flatten();
    }
    Ok(())
}

fn parse_document_row(row: &Row<'_>) -> DocumentResult<Document> {
    Ok(Document {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        parent_id: row.get("parent_id")?,
        created_at: row.get("created_at")?,
    })
}
