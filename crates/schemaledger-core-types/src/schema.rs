//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Unit identifiers
pub const FIELD_UNIT: &str = "unit";
pub const FIELD_OUTCOME: &str = "outcome";

// Run counters
pub const FIELD_PENDING_LEN: &str = "pending_len";
pub const FIELD_APPLIED_LEN: &str = "applied_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
