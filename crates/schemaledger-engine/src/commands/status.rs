//! Read-only views over registry and ledger: status, gaps, checksum drift.

use crate::runner::Runner;
use rusqlite::Connection;
use schemaledger_core::errors::{LedgerError, Result, SlError, SlErrorKind};
use schemaledger_core::model::{LedgerEntry, UnitName};
use schemaledger_core::registry::Registry;
use schemaledger_core::{log_op_end, log_op_error, log_op_start};
use schemaledger_store::ledger;
use std::collections::BTreeSet;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    Applied(LedgerEntry),
    Pending,
    /// Ledger entry whose unit is no longer in the registry
    Orphaned(LedgerEntry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub name: UnitName,
    pub status: UnitStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Registry units and orphaned entries, ascending by name
    pub rows: Vec<StatusRow>,
    /// Pending units ordered before the highest applied unit
    pub gaps: Vec<UnitName>,
}

impl StatusReport {
    pub fn pending_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.status == UnitStatus::Pending)
            .count()
    }
}

/// Pending units that sort before the newest applied unit
///
/// Empty unless someone applied units out of order or marked one by hand.
pub fn find_gaps(registry: &Registry, applied: &BTreeSet<UnitName>) -> Vec<UnitName> {
    let Some(highest) = applied.iter().next_back() else {
        return Vec::new();
    };
    registry
        .names()
        .filter(|n| *n < highest && !applied.contains(*n))
        .cloned()
        .collect()
}

impl<'r> Runner<'r> {
    /// Registry and ledger side by side
    pub fn status(&self, conn: &Connection) -> Result<StatusReport> {
        let mut entries: std::collections::BTreeMap<UnitName, LedgerEntry> = ledger::entries(conn)?
            .into_iter()
            .map(|e| (e.name.clone(), e))
            .collect();
        let applied: BTreeSet<UnitName> = entries.keys().cloned().collect();

        let mut rows: Vec<StatusRow> = self
            .registry()
            .names()
            .map(|name| StatusRow {
                name: name.clone(),
                status: match entries.remove(name) {
                    Some(entry) => UnitStatus::Applied(entry),
                    None => UnitStatus::Pending,
                },
            })
            .collect();
        rows.extend(entries.into_values().map(|entry| StatusRow {
            name: entry.name.clone(),
            status: UnitStatus::Orphaned(entry),
        }));
        rows.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(StatusReport {
            rows,
            gaps: find_gaps(self.registry(), &applied),
        })
    }

    /// Check applied units against their current checksums
    ///
    /// Returns the number of entries compared. Entries or units without a
    /// checksum are not compared.
    pub fn verify(&self, conn: &Connection) -> Result<usize> {
        log_op_start!("verify", run_id = %self.run_id());
        let start = Instant::now();

        let result = self.verify_impl(conn);
        match &result {
            Ok(checked) => log_op_end!(
                "verify",
                duration_ms = start.elapsed().as_millis() as u64,
                checked = *checked as u64
            ),
            Err(e) => log_op_error!(
                "verify",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            ),
        }
        result
    }

    fn verify_impl(&self, conn: &Connection) -> Result<usize> {
        let mut checked = 0;
        let mut drifted: Vec<LedgerError> = Vec::new();

        for entry in ledger::entries(conn)? {
            let Some(unit) = self.registry().get(&entry.name) else {
                continue;
            };
            let (Some(expected), Some(actual)) = (entry.checksum.as_ref(), unit.checksum()) else {
                continue;
            };
            checked += 1;
            if *expected != actual {
                drifted.push(LedgerError::ChecksumMismatch {
                    name: entry.name.to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        match drifted.len() {
            0 => Ok(checked),
            1 => Err(drifted.remove(0).into()),
            _ => {
                let first = match &drifted[0] {
                    LedgerError::ChecksumMismatch { name, .. } => name.clone(),
                    other => other.to_string(),
                };
                Err(SlError::new(SlErrorKind::ChecksumMismatch)
                    .with_op("verify")
                    .with_unit(first)
                    .with_message(
                        drifted
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("; "),
                    ))
            }
        }
    }
}
