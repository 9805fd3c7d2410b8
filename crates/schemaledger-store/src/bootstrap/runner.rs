//! Bootstrap runner
//!
//! Applies the embedded store migrations with checksums and idempotency.
//! Every step runs under an IMMEDIATE transaction and re-reads
//! `schema_version` once the write lock is held, so runners opening a fresh
//! database at the same time serialize instead of colliding on the insert.

use crate::bootstrap::embedded::get_migrations;
use crate::checksum::compute_checksum;
use crate::errors::{bootstrap_checksum_mismatch, bootstrap_error, from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Create the store's own tables if they are not there yet
pub fn bootstrap(conn: &mut Connection) -> Result<()> {
    create_schema_version_table(conn)?;

    for migration in get_migrations() {
        apply_migration(conn, migration.id, migration.sql)?;
    }

    Ok(())
}

fn begin_locked(conn: &mut Connection) -> Result<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)
}

/// Create the schema_version table if it doesn't exist
fn create_schema_version_table(conn: &mut Connection) -> Result<()> {
    let tx = begin_locked(conn)?;
    tx.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        )",
        [],
    )
    .map_err(from_rusqlite)?;
    tx.commit().map_err(from_rusqlite)
}

/// Apply a single bootstrap migration if not already applied
fn apply_migration(conn: &mut Connection, migration_id: &str, sql: &str) -> Result<()> {
    let checksum = compute_checksum(sql);
    let tx = begin_locked(conn)?;

    let recorded: Option<Option<String>> = tx
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?",
            [migration_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    if let Some(recorded) = recorded {
        return match recorded {
            Some(stored) if stored != checksum => Err(bootstrap_checksum_mismatch(
                migration_id,
                &stored,
                &checksum,
            )),
            _ => Ok(()),
        };
    }

    tx.execute_batch(sql)
        .map_err(|e| bootstrap_error(migration_id, &e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?, ?, ?)",
        rusqlite::params![migration_id, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(migration_id, "bootstrap migration applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaledger_core::SlErrorKind;

    #[test]
    fn test_bootstrap() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(bootstrap(&mut conn).is_ok());
    }

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        bootstrap(&mut conn).unwrap();
        assert!(bootstrap(&mut conn).is_ok());
    }

    #[test]
    fn test_edited_bootstrap_script_detected() {
        let mut conn = Connection::open_in_memory().unwrap();
        bootstrap(&mut conn).unwrap();
        conn.execute(
            "UPDATE schema_version SET checksum = 'deadbeef'
             WHERE migration_id = '001_schema_ledger'",
            [],
        )
        .unwrap();

        let err = bootstrap(&mut conn).unwrap_err();
        assert_eq!(err.kind(), SlErrorKind::ChecksumMismatch);
    }
}
