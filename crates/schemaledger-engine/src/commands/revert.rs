//! Reverting a single applied unit.

use crate::runner::{begin_unit_tx, Runner};
use rusqlite::Connection;
use schemaledger_core::errors::{LedgerError, Result, SlError, SlErrorKind};
use schemaledger_core::model::{UnitName, UnitState};
use schemaledger_core::queue::Enqueuer;
use schemaledger_core::unit::UnitContext;
use schemaledger_core::{log_op_end, log_op_error, log_op_start};
use schemaledger_store::errors::from_rusqlite;
use schemaledger_store::{ledger, SqliteJobQueue, SqliteSchemaExecutor};
use std::time::Instant;

impl<'r> Runner<'r> {
    /// Run a unit's revert and drop its ledger entry, atomically
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no unit with this name in the registry
    /// - `Irreversible`: the unit declares no reversal path; nothing is touched
    /// - `NotApplied`: the ledger has no entry for the unit
    /// - `RevertFailed`: the unit's revert raised; rolled back
    pub fn revert(&self, conn: &mut Connection, name: &UnitName) -> Result<()> {
        log_op_start!("revert", run_id = %self.run_id(), unit = name.as_str());
        let start = Instant::now();

        let result = self.revert_impl(conn, name).map_err(|e| {
            log_op_error!(
                "revert",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                unit = name.as_str()
            );
            e
        });

        if result.is_ok() {
            log_op_end!(
                "revert",
                duration_ms = start.elapsed().as_millis() as u64,
                unit = name.as_str()
            );
        }
        result
    }

    fn revert_impl(&self, conn: &mut Connection, name: &UnitName) -> Result<()> {
        let unit = self.lookup(name)?;
        if !unit.is_reversible() {
            return Err(LedgerError::Irreversible {
                name: name.to_string(),
            }
            .into());
        }

        let tx = begin_unit_tx(conn)?;
        if !ledger::contains(&tx, name)? {
            return Err(LedgerError::NotApplied {
                name: name.to_string(),
            }
            .into());
        }
        UnitState::Applied.transition(name.as_str(), UnitState::Pending)?;

        let schema = SqliteSchemaExecutor::new(&tx);
        let local_queue = SqliteJobQueue::for_unit(&tx, name);
        let queue: &dyn Enqueuer = match self.enqueuer() {
            Some(host) => host,
            None => &local_queue,
        };
        unit.revert(&UnitContext::new(&schema, queue))
            .map_err(|e| match e.kind() {
                SlErrorKind::Irreversible => e,
                _ => SlError::new(SlErrorKind::RevertFailed)
                    .with_op("revert")
                    .with_unit(name.as_str())
                    .with_run_id(self.run_id().clone())
                    .with_source(e),
            })?;

        ledger::delete(&tx, name)?;
        tx.commit().map_err(from_rusqlite)
    }
}
