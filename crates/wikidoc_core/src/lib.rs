//! Core domain logic for WikiDoc: a hierarchical document store with an
//! append-only audit log.
//! This crate is the single source of truth for business invariants.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tree;

pub use api::{Audited, DocumentApi, RequestContext};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use error::ErrorKind;
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::document::{Document, DocumentDraft, DocumentId, DocumentOrder, ValidationError};
pub use model::log_entry::{Action, Actor, LogEntry, LogOrder, LogQuery, UNKNOWN_ACTOR};
pub use repo::audit_repo::{AuditError, AuditRepository, AuditResult, SqliteAuditRepository};
pub use repo::document_repo::{
    DocumentError, DocumentRepository, DocumentResult, SqliteDocumentRepository,
};
pub use service::document_service::DocumentService;
pub use tree::{build_tree, flatten_forest, outline, OutlineEntry, TreeNode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
