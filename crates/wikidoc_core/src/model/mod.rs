//! Typed records shared by the document store, audit log and tree builder.
//!
//! # Invariants
//! - Documents are identified by store-assigned `DocumentId`s, never reused.
//! - Mutable document fields only reach storage through a validated
//!   `DocumentDraft`.
//! - Audit entries always carry an actor; missing identity becomes `unknown`.

pub mod document;
pub mod log_entry;

/// Error returned when an order or action name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value `{value}`; expected {expected}")]
pub struct ParseNameError {
    pub value: String,
    pub expected: &'static str,
}
