//! Engine-level ledger commands.
//!
//! One enum for every operation a front end can request, so the CLI (or
//! any other host) dispatches through a single entry point.

#![allow(clippy::result_large_err)]

use crate::commands::apply::{RunFailure, RunReport};
use crate::commands::status::StatusReport;
use crate::runner::Runner;
use rusqlite::Connection;
use schemaledger_core::errors::SlError;
use schemaledger_core::model::{LedgerEntry, UnitName};
use thiserror::Error;

/// Engine-level commands against one ledger database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    ListPending,
    ApplyAll,
    Revert { name: UnitName },
    MarkApplied { name: UnitName },
    MarkReverted { name: UnitName },
    Status,
    Verify,
}

/// Result of applying a ledger command.
#[derive(Debug, Clone)]
pub enum LedgerCommandResult {
    /// Pending unit names, in application order.
    Pending(Vec<UnitName>),
    Applied(RunReport),
    Reverted(UnitName),
    Marked(LedgerEntry),
    Unmarked(UnitName),
    Status(StatusReport),
    /// Number of entries whose checksums were compared.
    Verified(usize),
}

#[derive(Debug, Error)]
pub enum CommandError {
    /// A run stopped part-way; earlier units stay committed.
    #[error(transparent)]
    Run(#[from] RunFailure),
    #[error(transparent)]
    Ledger(#[from] SlError),
}

impl CommandError {
    /// The canonical error underneath either variant
    pub fn cause(&self) -> &SlError {
        match self {
            CommandError::Run(failure) => &failure.cause,
            CommandError::Ledger(err) => err,
        }
    }
}

/// Apply a ledger command through `runner`.
pub fn apply_ledger_command(
    cmd: LedgerCommand,
    runner: &Runner<'_>,
    conn: &mut Connection,
) -> Result<LedgerCommandResult, CommandError> {
    match cmd {
        LedgerCommand::ListPending => {
            let pending = runner.list_pending(conn)?;
            Ok(LedgerCommandResult::Pending(
                pending.iter().map(|u| u.name().clone()).collect(),
            ))
        }
        LedgerCommand::ApplyAll => Ok(LedgerCommandResult::Applied(runner.apply_all(conn)?)),
        LedgerCommand::Revert { name } => {
            runner.revert(conn, &name)?;
            Ok(LedgerCommandResult::Reverted(name))
        }
        LedgerCommand::MarkApplied { name } => {
            Ok(LedgerCommandResult::Marked(runner.mark_applied(conn, &name)?))
        }
        LedgerCommand::MarkReverted { name } => {
            runner.mark_reverted(conn, &name)?;
            Ok(LedgerCommandResult::Unmarked(name))
        }
        LedgerCommand::Status => Ok(LedgerCommandResult::Status(runner.status(conn)?)),
        LedgerCommand::Verify => Ok(LedgerCommandResult::Verified(runner.verify(conn)?)),
    }
}
