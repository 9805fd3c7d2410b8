//! Pending-unit discovery and application.
//!
//! ## Logging Ownership
//!
//! This module owns lifecycle logging for `apply_all` and for each
//! `apply_unit` inside it. Store and core log at debug level only.

use crate::commands::status::find_gaps;
use crate::runner::{begin_unit_tx, Runner};
use rusqlite::Connection;
use schemaledger_core::errors::{Result, SlError, SlErrorKind};
use schemaledger_core::guard::first_tripped;
use schemaledger_core::model::{EntryOutcome, LedgerEntry, UnitName, UnitState};
use schemaledger_core::queue::Enqueuer;
use schemaledger_core::unit::{MigrationUnit, UnitContext};
use schemaledger_core::{log_op_end, log_op_error, log_op_start};
use schemaledger_store::errors::from_rusqlite;
use schemaledger_store::{ledger, SqliteJobQueue, SqliteSchemaExecutor};
use std::time::Instant;

/// What happened to one unit during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// `apply` ran and committed with its ledger entry
    Applied,
    /// A guard tripped; recorded as a no-op
    Skipped { reason: String },
    /// Another runner recorded the unit first; nothing was committed here
    AppliedElsewhere,
}

impl UnitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOutcome::Applied => "applied",
            UnitOutcome::Skipped { .. } => "skipped",
            UnitOutcome::AppliedElsewhere => "applied_elsewhere",
        }
    }
}

/// Per-unit outcomes of a run, in application order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<(UnitName, UnitOutcome)>,
}

impl RunReport {
    /// Units this run recorded in the ledger (applied or skipped)
    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| !matches!(o, UnitOutcome::AppliedElsewhere))
            .count()
    }

    /// Names of units this run recorded, in order
    pub fn applied_names(&self) -> Vec<&UnitName> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !matches!(o, UnitOutcome::AppliedElsewhere))
            .map(|(n, _)| n)
            .collect()
    }

    /// Units found already applied by a concurrent runner
    pub fn conflicts(&self) -> Vec<&UnitName> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, UnitOutcome::AppliedElsewhere))
            .map(|(n, _)| n)
            .collect()
    }
}

/// A run that stopped early
///
/// `report` holds the units that committed before the failure; they stay
/// committed.
#[derive(Debug, Clone)]
pub struct RunFailure {
    /// The unit that failed, or None if the run failed before reaching one
    pub unit: Option<UnitName>,
    pub cause: SlError,
    pub report: RunReport,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "unit {}: {}", unit, self.cause)?,
            None => write!(f, "{}", self.cause)?,
        }
        write!(
            f,
            " ({} unit(s) applied before failure)",
            self.report.applied_count()
        )
    }
}

// `cause` is rendered by Display, so it is not reported again as a source.
impl std::error::Error for RunFailure {}

impl<'r> Runner<'r> {
    /// Units not yet in the ledger, ascending by name
    pub fn list_pending(&self, conn: &Connection) -> Result<Vec<&'r dyn MigrationUnit>> {
        let applied = ledger::applied_names(conn)?;
        Ok(self
            .registry()
            .iter()
            .filter(|u| !applied.contains(u.name()))
            .collect())
    }

    /// Apply every pending unit in order, stopping at the first failure
    pub fn apply_all(&self, conn: &mut Connection) -> std::result::Result<RunReport, RunFailure> {
        log_op_start!("apply_all", run_id = %self.run_id());
        let start = Instant::now();

        let result = self.apply_all_impl(conn);

        match &result {
            Ok(report) => {
                log_op_end!(
                    "apply_all",
                    duration_ms = start.elapsed().as_millis() as u64,
                    run_id = %self.run_id(),
                    applied_len = report.applied_count() as u64
                );
            }
            Err(failure) => {
                log_op_error!(
                    "apply_all",
                    failure.cause.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    run_id = %self.run_id(),
                    applied_len = failure.report.applied_count() as u64
                );
            }
        }

        result
    }

    fn apply_all_impl(&self, conn: &mut Connection) -> std::result::Result<RunReport, RunFailure> {
        let before_any_unit = |cause: SlError| RunFailure {
            unit: None,
            cause: cause.with_run_id(self.run_id().clone()),
            report: RunReport::default(),
        };

        let applied = ledger::applied_names(conn).map_err(before_any_unit)?;
        let gaps = find_gaps(self.registry(), &applied);
        if !gaps.is_empty() {
            tracing::warn!(
                run_id = %self.run_id(),
                gaps = ?gaps.iter().map(UnitName::as_str).collect::<Vec<_>>(),
                "pending units ordered before already-applied ones; applying them in order"
            );
        }

        let pending = self.list_pending(conn).map_err(before_any_unit)?;
        self.apply_units(conn, &pending)
    }

    /// Apply the given units in slice order
    ///
    /// `apply_all` passes a freshly computed pending list. A caller holding
    /// an older list (one computed before another runner ran) gets
    /// `AppliedElsewhere` outcomes for units that are now in the ledger.
    pub fn apply_units(
        &self,
        conn: &mut Connection,
        units: &[&dyn MigrationUnit],
    ) -> std::result::Result<RunReport, RunFailure> {
        let mut report = RunReport::default();

        for unit in units {
            match self.apply_unit(conn, *unit) {
                Ok(outcome) => report.outcomes.push((unit.name().clone(), outcome)),
                Err(cause) => {
                    return Err(RunFailure {
                        unit: Some(unit.name().clone()),
                        cause: SlError::new(SlErrorKind::ApplyFailed)
                            .with_op("apply_unit")
                            .with_unit(unit.name().as_str())
                            .with_run_id(self.run_id().clone())
                            .with_source(cause),
                        report,
                    });
                }
            }
        }

        Ok(report)
    }

    fn apply_unit(&self, conn: &mut Connection, unit: &dyn MigrationUnit) -> Result<UnitOutcome> {
        let name = unit.name().as_str();
        log_op_start!("apply_unit", run_id = %self.run_id(), unit = name);
        let start = Instant::now();

        let state = UnitState::Pending.transition(name, UnitState::Applying)?;

        match self.apply_unit_impl(conn, unit) {
            Ok(outcome) => {
                let state = state.transition(name, UnitState::Applied)?;
                log_op_end!(
                    "apply_unit",
                    duration_ms = start.elapsed().as_millis() as u64,
                    run_id = %self.run_id(),
                    unit = name,
                    outcome = outcome.as_str(),
                    state = state.as_str()
                );
                Ok(outcome)
            }
            Err(err) => {
                let state = state.transition(name, UnitState::Failed)?;
                log_op_error!(
                    "apply_unit",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    run_id = %self.run_id(),
                    unit = name,
                    state = state.as_str()
                );
                Err(err)
            }
        }
    }

    fn apply_unit_impl(
        &self,
        conn: &mut Connection,
        unit: &dyn MigrationUnit,
    ) -> Result<UnitOutcome> {
        let name = unit.name();
        let tx = begin_unit_tx(conn)?;

        // Re-read under the write lock: the pending list may be stale.
        if ledger::contains(&tx, name)? {
            tracing::debug!(unit = %name, "already in ledger");
            return Ok(UnitOutcome::AppliedElsewhere);
        }

        let schema = SqliteSchemaExecutor::new(&tx);
        let local_queue = SqliteJobQueue::for_unit(&tx, name);
        let queue: &dyn Enqueuer = match self.enqueuer() {
            Some(host) => host,
            None => &local_queue,
        };
        let ctx = UnitContext::new(&schema, queue);

        let outcome = match first_tripped(unit.guards(), &schema)? {
            Some(guard) => {
                tracing::debug!(unit = %name, guard = %guard, "guard tripped, skipping");
                UnitOutcome::Skipped {
                    reason: guard.to_string(),
                }
            }
            None => {
                unit.apply(&ctx)?;
                UnitOutcome::Applied
            }
        };

        let entry_outcome = match &outcome {
            UnitOutcome::Skipped { .. } => EntryOutcome::Skipped,
            _ => EntryOutcome::Applied,
        };
        let entry = LedgerEntry::new(name.clone(), unit.checksum(), entry_outcome);
        match ledger::insert(&tx, &entry) {
            Ok(()) => {}
            Err(e) if e.kind() == SlErrorKind::LedgerConflict => {
                tracing::debug!(unit = %name, "lost ledger insert race, rolling back");
                return Ok(UnitOutcome::AppliedElsewhere);
            }
            Err(e) => return Err(e),
        }

        tx.commit().map_err(from_rusqlite)?;
        Ok(outcome)
    }
}
