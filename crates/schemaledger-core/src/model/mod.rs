pub mod job;
pub mod ledger_entry;
pub mod state;
pub mod unit_name;

pub use job::Job;
pub use ledger_entry::{EntryOutcome, LedgerEntry};
pub use state::UnitState;
pub use unit_name::UnitName;
