//! Error handling for schemaledger-store
//!
//! Wraps the core SlError with store-specific helpers

use schemaledger_core::errors::{SlError, SlErrorKind};

/// Result type alias using SlError
pub type Result<T> = std::result::Result<T, SlError>;

/// Create a bootstrap migration error
pub fn bootstrap_error(migration_id: &str, reason: &str) -> SlError {
    SlError::new(SlErrorKind::Persistence)
        .with_op("bootstrap")
        .with_message(format!("Bootstrap migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error for a bootstrap migration
pub fn bootstrap_checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> SlError {
    SlError::new(SlErrorKind::ChecksumMismatch)
        .with_op("bootstrap_checksum")
        .with_message(format!(
            "Checksum mismatch for bootstrap migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a unit file validation error
pub fn unit_file_error(path: &str, reason: &str) -> SlError {
    SlError::new(SlErrorKind::InvalidInput)
        .with_op("load_units")
        .with_message(format!("{}: {}", path, reason))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> SlError {
    SlError::new(SlErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// True for UNIQUE / PRIMARY KEY violations
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
                && matches!(
                    e.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                )
        }
        _ => false,
    }
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> SlError {
    SlError::new(SlErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
