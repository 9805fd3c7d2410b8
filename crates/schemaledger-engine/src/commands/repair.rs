//! Manual ledger repair: record or forget a unit without running it.

use crate::runner::{begin_unit_tx, Runner};
use rusqlite::Connection;
use schemaledger_core::errors::{LedgerError, Result};
use schemaledger_core::model::{EntryOutcome, LedgerEntry, UnitName};
use schemaledger_core::{log_op_end, log_op_error, log_op_start};
use schemaledger_store::errors::from_rusqlite;
use schemaledger_store::ledger;
use std::time::Instant;

impl<'r> Runner<'r> {
    /// Record a unit as applied without touching the schema
    ///
    /// For when an operator has already made the change by hand.
    pub fn mark_applied(&self, conn: &mut Connection, name: &UnitName) -> Result<LedgerEntry> {
        log_op_start!("mark_applied", run_id = %self.run_id(), unit = name.as_str());
        let start = Instant::now();

        let result = self.mark_applied_impl(conn, name);
        match &result {
            Ok(_) => log_op_end!(
                "mark_applied",
                duration_ms = start.elapsed().as_millis() as u64,
                unit = name.as_str()
            ),
            Err(e) => log_op_error!(
                "mark_applied",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                unit = name.as_str()
            ),
        }
        result
    }

    fn mark_applied_impl(&self, conn: &mut Connection, name: &UnitName) -> Result<LedgerEntry> {
        let unit = self.lookup(name)?;
        let tx = begin_unit_tx(conn)?;
        if ledger::contains(&tx, name)? {
            return Err(LedgerError::AlreadyApplied {
                name: name.to_string(),
            }
            .into());
        }
        let entry = LedgerEntry::new(name.clone(), unit.checksum(), EntryOutcome::Marked);
        ledger::insert(&tx, &entry)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(entry)
    }

    /// Forget a unit's ledger entry without touching the schema
    ///
    /// Works for names no longer in the registry, so stale entries can be
    /// cleaned up.
    pub fn mark_reverted(&self, conn: &Connection, name: &UnitName) -> Result<()> {
        log_op_start!("mark_reverted", run_id = %self.run_id(), unit = name.as_str());
        let start = Instant::now();

        let result = match ledger::delete(conn, name) {
            Ok(true) => Ok(()),
            Ok(false) => Err(LedgerError::NotApplied {
                name: name.to_string(),
            }
            .into()),
            Err(e) => Err(e),
        };

        match &result {
            Ok(()) => log_op_end!(
                "mark_reverted",
                duration_ms = start.elapsed().as_millis() as u64,
                unit = name.as_str()
            ),
            Err(e) => log_op_error!(
                "mark_reverted",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                unit = name.as_str()
            ),
        }
        result
    }
}
