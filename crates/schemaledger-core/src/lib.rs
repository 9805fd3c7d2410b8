//! SchemaLedger Core - migration unit model and collaborator seams
//!
//! This crate provides the storage-independent half of the runner:
//! - `UnitName`, `LedgerEntry` and the per-unit state machine
//! - The `MigrationUnit` trait and declarative `Guard` preconditions
//! - `SchemaExecutor` and `Enqueuer`, the two collaborators a unit may use
//! - The ordered unit `Registry`
//! - Canonical error and logging facilities shared by every crate

pub mod errors;
pub mod executor;
pub mod guard;
pub mod logging_facility;
pub mod model;
pub mod queue;
pub mod registry;
pub mod unit;

// Re-export commonly used types
pub use errors::{LedgerError, Result, SlError, SlErrorKind};
pub use executor::{SchemaExecutor, SqlValue};
pub use guard::Guard;
pub use model::{EntryOutcome, Job, LedgerEntry, UnitName, UnitState};
pub use queue::{Enqueuer, RecordingEnqueuer};
pub use registry::Registry;
pub use unit::{MigrationUnit, UnitContext};
