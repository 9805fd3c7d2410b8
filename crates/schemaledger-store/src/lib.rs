//! SchemaLedger Store - SQLite persistence for the migration runner
//!
//! Provides:
//! - Connection setup and the store's own bootstrap tables
//! - Ledger table access (`schema_ledger`)
//! - `SqliteSchemaExecutor`, the SQLite implementation of the schema seam
//! - `SqliteJobQueue`, the default in-transaction `Enqueuer`
//! - Loading units from a directory of SQL files

pub mod bootstrap;
pub mod checksum;
pub mod db;
pub mod errors;
pub mod executor;
pub mod ledger;
pub mod queue;
pub mod sql_unit;

// Re-export key types
pub use errors::Result;
pub use executor::SqliteSchemaExecutor;
pub use queue::SqliteJobQueue;
pub use sql_unit::SqlUnit;
