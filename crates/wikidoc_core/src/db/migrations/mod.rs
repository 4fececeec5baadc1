//! Schema migrations for the document store.
//!
//! # Invariants
//! - Steps are ordered by strictly increasing `version`.
//! - `PRAGMA user_version` equals the last applied step.
//! - Pending steps run under the database write lock, and the version is
//!   re-read after the lock is held, so concurrent first opens of one file
//!   apply every step exactly once.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, TransactionBehavior};

/// One schema step: the SQL that moves the schema from `version - 1` to `version`.
struct SchemaStep {
    version: u32,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        sql: include_str!("0001_documents.sql"),
    },
    SchemaStep {
        version: 2,
        sql: include_str!("0002_activity_logs.sql"),
    },
];

/// Returns the schema version this build writes and expects.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `Sqlite` when a step fails; no step of the batch is kept in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let latest = latest_version();
    if check_version(read_version(conn)?, latest)? {
        return Ok(());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let from_version = read_version(&tx)?;
    if check_version(from_version, latest)? {
        debug!("event=db_migrate module=db status=skipped reason=applied_concurrently version={from_version}");
        return Ok(());
    }

    for step in SCHEMA_STEPS.iter().filter(|step| step.version > from_version) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={latest}");
    Ok(())
}

/// `Ok(true)` when nothing is pending.
fn check_version(version: u32, latest: u32) -> DbResult<bool> {
    if version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: latest,
        });
    }
    Ok(version == latest)
}

fn read_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
