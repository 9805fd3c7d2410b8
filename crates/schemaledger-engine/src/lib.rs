//! SchemaLedger Engine - Orchestration layer
//!
//! Runs registered migration units against a SQLite database, one
//! transaction per unit, recording each in the ledger.

pub mod commands;
pub mod runner;

pub use commands::apply::{RunFailure, RunReport, UnitOutcome};
pub use commands::engine_command::{
    apply_ledger_command, CommandError, LedgerCommand, LedgerCommandResult,
};
pub use commands::status::{find_gaps, StatusReport, StatusRow, UnitStatus};
pub use runner::Runner;
