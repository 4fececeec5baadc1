//! Document use-case service.
//!
//! # Responsibility
//! - Turn raw caller fields into a validated `DocumentDraft`.
//! - Map repository "absent" results into `NotFound` errors.
//!
//! # Invariants
//! - Validation failures are returned before any storage access.
//! - Service APIs never bypass repository transaction contracts.

use crate::model::document::{Document, DocumentDraft, DocumentId, DocumentOrder};
use crate::repo::document_repo::{DocumentError, DocumentRepository, DocumentResult};

/// Document store facade over a repository implementation.
pub struct DocumentService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> DocumentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one document.
    ///
    /// # Errors
    /// - `Validation` for a blank title or content.
    /// - `ParentNotFound` when `parent_id` names no stored document.
    pub fn create(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        parent_id: Option<DocumentId>,
    ) -> DocumentResult<Document> {
        let draft = DocumentDraft::new(title, content, parent_id)?;
        self.repo.create_document(&draft)
    }

    pub fn get(&self, id: DocumentId) -> DocumentResult<Document> {
        self.repo
            .get_document(id)?
            .ok_or(DocumentError::NotFound(id))
    }

    pub fn list(&self, order: DocumentOrder) -> DocumentResult<Vec<Document>> {
        self.repo.list_documents(order)
    }

    /// Lists direct children of an existing document.
    pub fn list_children(&self, parent_id: DocumentId) -> DocumentResult<Vec<Document>> {
        self.get(parent_id)?;
        self.repo.list_children(parent_id)
    }

    /// Replaces title, content and parent of one document.
    ///
    /// `parent_id = None` moves the document to root.
    ///
    /// # Errors
    /// - `Validation` for a blank title or content.
    /// - `NotFound` / `ParentNotFound` for unknown ids.
    /// - `Cycle` when the new parent is the document itself or a descendant.
    pub fn update(
        &self,
        id: DocumentId,
        title: impl Into<String>,
        content: impl Into<String>,
        parent_id: Option<DocumentId>,
    ) -> DocumentResult<Document> {
        let draft = DocumentDraft::new(title, content, parent_id)?;
        self.repo.update_document(id, &draft)
    }

    /// Hard-deletes one document. Children are left in place and read as roots.
    pub fn delete(&self, id: DocumentId) -> DocumentResult<Document> {
        self.repo.delete_document(id)
    }
}
