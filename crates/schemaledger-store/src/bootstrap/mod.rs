//! Store bootstrap
//!
//! Creates the ledger and job queue tables before any unit runs. Tracked
//! separately from units in `schema_version`, with checksums so an edited
//! bootstrap script is caught instead of silently ignored.

mod embedded;
mod runner;

pub use runner::bootstrap;
