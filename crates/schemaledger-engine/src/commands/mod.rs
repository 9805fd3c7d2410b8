//! Command orchestration layer.
//!
//! Each module adds `Runner` methods for one concern and owns their
//! lifecycle logging. Store and core stay at debug level.

pub mod apply;
pub mod engine_command;
pub mod repair;
pub mod revert;
pub mod status;
