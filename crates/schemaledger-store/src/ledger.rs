//! Ledger table access
//!
//! `schema_ledger` is append-only from the runner's point of view: rows are
//! inserted once, read, and deleted only by revert or manual repair.

use crate::errors::{from_rusqlite, is_unique_violation, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use schemaledger_core::errors::{LedgerError, SlError, SlErrorKind};
use schemaledger_core::model::{EntryOutcome, LedgerEntry, UnitName};
use std::collections::BTreeSet;

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<(String, i64, Option<String>, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode(raw: (String, i64, Option<String>, String)) -> Result<LedgerEntry> {
    let (name, applied_at_ms, checksum, outcome) = raw;
    let applied_at: DateTime<Utc> =
        DateTime::from_timestamp_millis(applied_at_ms).ok_or_else(|| {
            SlError::new(SlErrorKind::Persistence)
                .with_op("ledger_read")
                .with_unit(name.clone())
                .with_message(format!("applied_at {} out of range", applied_at_ms))
        })?;
    Ok(LedgerEntry {
        name: UnitName::new(name)?,
        applied_at,
        checksum,
        outcome: outcome.parse::<EntryOutcome>()?,
    })
}

/// All ledger entries in ascending name order
///
/// Rows whose `unit_name` is not a valid unit name are skipped with a warning.
pub fn entries(conn: &Connection) -> Result<Vec<LedgerEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT unit_name, applied_at, checksum, outcome
             FROM schema_ledger ORDER BY unit_name",
        )
        .map_err(from_rusqlite)?;
    let raw = stmt
        .query_map([], row_to_entry)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    let mut decoded = Vec::with_capacity(raw.len());
    for row in raw {
        // Only a hand edit can produce one of these; skip it rather than fail.
        if UnitName::new(row.0.as_str()).is_err() {
            tracing::warn!(unit_name = %row.0, "skipping ledger row with invalid unit name");
            continue;
        }
        decoded.push(decode(row)?);
    }
    Ok(decoded)
}

/// Names of every unit the ledger records
pub fn applied_names(conn: &Connection) -> Result<BTreeSet<UnitName>> {
    Ok(entries(conn)?.into_iter().map(|e| e.name).collect())
}

pub fn get(conn: &Connection, name: &UnitName) -> Result<Option<LedgerEntry>> {
    let raw = conn
        .query_row(
            "SELECT unit_name, applied_at, checksum, outcome
             FROM schema_ledger WHERE unit_name = ?1",
            [name.as_str()],
            row_to_entry,
        )
        .optional()
        .map_err(from_rusqlite)?;

    raw.map(decode).transpose()
}

pub fn contains(conn: &Connection, name: &UnitName) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM schema_ledger WHERE unit_name = ?1",
            [name.as_str()],
            |_| Ok(()),
        )
        .optional()
        .map_err(from_rusqlite)?;
    Ok(found.is_some())
}

/// Record an entry
///
/// # Errors
///
/// `LedgerConflict` if a row for the unit already exists; the caller is
/// expected to roll back its transaction.
pub fn insert(conn: &Connection, entry: &LedgerEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_ledger (unit_name, applied_at, checksum, outcome)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.name.as_str(),
            entry.applied_at.timestamp_millis(),
            entry.checksum,
            entry.outcome.as_str(),
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            LedgerError::LedgerConflict {
                name: entry.name.to_string(),
            }
            .into()
        } else {
            from_rusqlite(e)
        }
    })?;

    tracing::debug!(unit = %entry.name, outcome = %entry.outcome, "ledger entry written");
    Ok(())
}

/// Remove an entry. Returns whether a row was deleted.
pub fn delete(conn: &Connection, name: &UnitName) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM schema_ledger WHERE unit_name = ?1", [name.as_str()])
        .map_err(from_rusqlite)?;
    Ok(deleted > 0)
}
