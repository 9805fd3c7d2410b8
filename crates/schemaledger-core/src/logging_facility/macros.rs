//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations.
//! Only the engine layer emits them; store and core log at debug level.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use schemaledger_core::log_op_start;
/// log_op_start!("apply_all");
/// log_op_start!("apply_unit", unit = "m20240101_000000_add_sku");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = schemaledger_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = schemaledger_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use schemaledger_core::log_op_end;
/// log_op_end!("apply_all", duration_ms = 42, applied_len = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = schemaledger_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = schemaledger_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```
/// # use schemaledger_core::{log_op_error, errors::LedgerError};
/// let err = LedgerError::Irreversible { name: "m1".to_string() };
/// log_op_error!("revert", err, duration_ms = 10, unit = "m1");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::SlError;
        let ex_err: SlError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = schemaledger_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::SlError;
        let ex_err: SlError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = schemaledger_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($field)*
        );
    }};
}
