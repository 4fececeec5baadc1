//! Request-level API composing the document store with the audit log.
//!
//! # Responsibility
//! - Expose the logical request/response contract used by front-ends.
//! - Record exactly one audit entry per accepted mutation.
//!
//! # Invariants
//! - The audit append happens only after the mutation has committed.
//! - A failed append never rolls the mutation back; it is reported through
//!   [`Audited::audit`] instead.
//! - Rejected mutations append no audit entry.
//! - Caller identity arrives through [`RequestContext`]; nothing is read
//!   from ambient session state.

use crate::db::DbResult;
use crate::model::document::{Document, DocumentId, DocumentOrder};
use crate::model::log_entry::{Action, Actor, LogEntry, LogQuery};
use crate::repo::audit_repo::{AuditRepository, AuditResult, SqliteAuditRepository};
use crate::repo::document_repo::{
    DocumentError, DocumentRepository, DocumentResult, SqliteDocumentRepository,
};
use crate::service::document_service::DocumentService;
use crate::tree::{build_tree, TreeNode};
use log::{info, warn};
use rusqlite::Connection;

/// Per-request caller context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: Actor,
}

impl RequestContext {
    /// Builds a context from the identity resolver's output, if any.
    pub fn new(identity: Option<&str>) -> Self {
        Self {
            actor: Actor::resolve(identity),
        }
    }
}

/// A committed mutation result paired with its audit append outcome.
#[derive(Debug)]
pub struct Audited<T> {
    pub value: T,
    pub audit: AuditResult<LogEntry>,
}

impl<T> Audited<T> {
    /// Returns `true` when the mutation succeeded but its audit entry was lost.
    pub fn is_degraded(&self) -> bool {
        self.audit.is_err()
    }

    pub fn entry(&self) -> Option<&LogEntry> {
        self.audit.as_ref().ok()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Document API over a document repository and an audit repository.
pub struct DocumentApi<D: DocumentRepository, A: AuditRepository> {
    documents: DocumentService<D>,
    audit: A,
}

impl<'conn> DocumentApi<SqliteDocumentRepository<'conn>, SqliteAuditRepository<'conn>> {
    /// Builds the SQLite-backed API over one migrated connection.
    pub fn sqlite(conn: &'conn Connection) -> DbResult<Self> {
        Ok(Self::new(
            SqliteDocumentRepository::try_new(conn)?,
            SqliteAuditRepository::try_new(conn)?,
        ))
    }
}

impl<D: DocumentRepository, A: AuditRepository> DocumentApi<D, A> {
    pub fn new(documents: D, audit: A) -> Self {
        Self {
            documents: DocumentService::new(documents),
            audit,
        }
    }

    pub fn list_documents(&self, order: DocumentOrder) -> DocumentResult<Vec<Document>> {
        self.documents.list(order)
    }

    pub fn get_document(&self, id: DocumentId) -> DocumentResult<Document> {
        self.documents.get(id)
    }

    pub fn list_children(&self, parent_id: DocumentId) -> DocumentResult<Vec<Document>> {
        self.documents.list_children(parent_id)
    }

    /// Builds the forest of all documents in `created_asc` order.
    pub fn document_tree(&self) -> DocumentResult<Vec<TreeNode>> {
        let documents = self.documents.list(DocumentOrder::CreatedAsc)?;
        Ok(build_tree(&documents))
    }

    pub fn create_document(
        &self,
        ctx: &RequestContext,
        title: impl Into<String>,
        content: impl Into<String>,
        parent_id: Option<DocumentId>,
    ) -> DocumentResult<Audited<Document>> {
        let document = self
            .documents
            .create(title, content, parent_id)
            .inspect_err(|err| log_rejected(Action::Create, None, err))?;
        info!(
            "event=document_mutation module=api status=ok action=create doc_id={} parent_id={:?}",
            document.id, document.parent_id
        );
        Ok(self.record(ctx, Action::Create, document))
    }

    pub fn update_document(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        title: impl Into<String>,
        content: impl Into<String>,
        parent_id: Option<DocumentId>,
    ) -> DocumentResult<Audited<Document>> {
        let document = self
            .documents
            .update(id, title, content, parent_id)
            .inspect_err(|err| log_rejected(Action::Update, Some(id), err))?;
        info!(
            "event=document_mutation module=api status=ok action=update doc_id={} parent_id={:?}",
            document.id, document.parent_id
        );
        Ok(self.record(ctx, Action::Update, document))
    }

    /// Deletes one document and returns the removed record.
    pub fn delete_document(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
    ) -> DocumentResult<Audited<Document>> {
        let document = self
            .documents
            .delete(id)
            .inspect_err(|err| log_rejected(Action::Delete, Some(id), err))?;
        info!("event=document_mutation module=api status=ok action=delete doc_id={id}");
        Ok(self.record(ctx, Action::Delete, document))
    }

    pub fn list_logs(&self, query: &LogQuery) -> AuditResult<Vec<LogEntry>> {
        self.audit.list(query)
    }

    fn record(&self, ctx: &RequestContext, action: Action, document: Document) -> Audited<Document> {
        let audit = self
            .audit
            .append(&ctx.actor, action, document.id, Some(document.title.as_str()));
        if let Err(err) = &audit {
            warn!(
                "event=audit_append module=api status=error action={action} doc_id={} error_code=audit_degraded error={err}",
                document.id
            );
        }
        Audited {
            value: document,
            audit,
        }
    }
}

fn log_rejected(action: Action, doc_id: Option<DocumentId>, err: &DocumentError) {
    info!(
        "event=document_mutation module=api status=rejected action={action} doc_id={doc_id:?} error_kind={}",
        err.kind()
    );
}
