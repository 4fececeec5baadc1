//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/API orchestration.
//!
//! # Invariants
//! - Every mutation runs inside one `BEGIN IMMEDIATE` transaction, so its
//!   existence, parent and cycle checks see the same snapshot as its write.
//! - Repository constructors reject connections that are not fully migrated.

pub mod audit_repo;
pub mod document_repo;

/// SQL expression for the current time in Unix epoch milliseconds.
pub(crate) const NOW_EPOCH_MS_SQL: &str =
    "CAST((julianday('now') - 2440587.5) * 86400000.0 AS INTEGER)";
