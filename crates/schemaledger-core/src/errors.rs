use schemaledger_core_types::RunId;
use thiserror::Error;

/// Result type alias using the canonical error facility
pub type Result<T> = std::result::Result<T, SlError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in SchemaLedger. Each kind maps to a stable error code that can be used
/// for programmatic error handling, testing, and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidUnitName,
    DuplicateUnit,
    NotFound,

    // Ledger state
    AlreadyApplied,
    NotApplied,
    /// Another runner committed a ledger entry for the unit first
    LedgerConflict,
    ChecksumMismatch,

    // Unit execution
    /// The unit's apply operation failed; the run stops here
    ApplyFailed,
    /// Revert requested on a unit that declares no reversal path
    Irreversible,
    RevertFailed,
    EnqueueFailed,
    IllegalTransition,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl SlErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            SlErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            SlErrorKind::InvalidUnitName => "ERR_INVALID_UNIT_NAME",
            SlErrorKind::DuplicateUnit => "ERR_DUPLICATE_UNIT",
            SlErrorKind::NotFound => "ERR_NOT_FOUND",
            SlErrorKind::AlreadyApplied => "ERR_ALREADY_APPLIED",
            SlErrorKind::NotApplied => "ERR_NOT_APPLIED",
            SlErrorKind::LedgerConflict => "ERR_LEDGER_CONFLICT",
            SlErrorKind::ChecksumMismatch => "ERR_CHECKSUM_MISMATCH",
            SlErrorKind::ApplyFailed => "ERR_APPLY_FAILED",
            SlErrorKind::Irreversible => "ERR_IRREVERSIBLE",
            SlErrorKind::RevertFailed => "ERR_REVERT_FAILED",
            SlErrorKind::EnqueueFailed => "ERR_ENQUEUE_FAILED",
            SlErrorKind::IllegalTransition => "ERR_ILLEGAL_TRANSITION",
            SlErrorKind::Io => "ERR_IO",
            SlErrorKind::Serialization => "ERR_SERIALIZATION",
            SlErrorKind::Persistence => "ERR_PERSISTENCE",
            SlErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and enough
/// context (operation, unit, run) to debug a failed run from the log alone.
#[derive(Debug, Clone)]
pub struct SlError {
    kind: SlErrorKind,
    op: Option<String>,
    unit: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<SlError>>,
}

impl SlError {
    /// Create a new error with the specified kind
    pub fn new(kind: SlErrorKind) -> Self {
        Self {
            kind,
            op: None,
            unit: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Set the operation name
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Set the unit name the error concerns
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the run id
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Set the message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the underlying cause
    pub fn with_source(mut self, source: SlError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> SlErrorKind {
        self.kind
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&SlError> {
        self.source.as_deref()
    }

    /// The innermost error in the source chain
    pub fn root_cause(&self) -> &SlError {
        let mut current = self;
        while let Some(next) = current.source.as_deref() {
            current = next;
        }
        current
    }
}

impl std::fmt::Display for SlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " {}", op)?;
        }
        if let Some(unit) = &self.unit {
            write!(f, " (unit {})", unit)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

// The wrapped chain is part of Display, so `source()` stays empty.
impl std::error::Error for SlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

// ========== Domain Errors ==========

/// Domain-level ledger errors
///
/// Raised by core logic and converted into `SlError` at crate boundaries.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Unit name failed validation
    #[error("Invalid unit name {name:?}: {reason}")]
    InvalidUnitName { name: String, reason: String },

    /// Two units registered under the same name
    #[error("Unit {name} is registered more than once")]
    DuplicateUnit { name: String },

    /// No unit with this name in the registry
    #[error("Unit {name} not found in registry")]
    UnitNotFound { name: String },

    /// Ledger already records this unit
    #[error("Unit {name} is already recorded in the ledger")]
    AlreadyApplied { name: String },

    /// Ledger does not record this unit
    #[error("Unit {name} is not recorded in the ledger")]
    NotApplied { name: String },

    /// Unique-constraint race on the ledger insert
    #[error("Unit {name} was applied by a concurrent runner")]
    LedgerConflict { name: String },

    /// Unit declares no reversal path
    #[error("Unit {name} cannot be reverted")]
    Irreversible { name: String },

    /// Stored checksum disagrees with the unit's current content
    #[error("Checksum mismatch for unit {name}: ledger has {expected}, unit has {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// State machine edge not allowed
    #[error("Illegal state transition for unit {name}: {from} -> {to}")]
    IllegalTransition {
        name: String,
        from: String,
        to: String,
    },

    /// Collaborator refused a job
    #[error("Failed to enqueue job {job_kind}: {reason}")]
    EnqueueFailed { job_kind: String, reason: String },

    /// Malformed input (unit files, directives, config)
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Conversion from LedgerError to SlError
impl From<LedgerError> for SlError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::InvalidUnitName { name, .. } => {
                SlError::new(SlErrorKind::InvalidUnitName).with_unit(name)
            }
            LedgerError::DuplicateUnit { name } => {
                SlError::new(SlErrorKind::DuplicateUnit).with_unit(name)
            }
            LedgerError::UnitNotFound { name } => {
                SlError::new(SlErrorKind::NotFound).with_unit(name)
            }
            LedgerError::AlreadyApplied { name } => {
                SlError::new(SlErrorKind::AlreadyApplied).with_unit(name)
            }
            LedgerError::NotApplied { name } => {
                SlError::new(SlErrorKind::NotApplied).with_unit(name)
            }
            LedgerError::LedgerConflict { name } => {
                SlError::new(SlErrorKind::LedgerConflict).with_unit(name)
            }
            LedgerError::Irreversible { name } => {
                SlError::new(SlErrorKind::Irreversible).with_unit(name)
            }
            LedgerError::ChecksumMismatch { name, .. } => {
                SlError::new(SlErrorKind::ChecksumMismatch).with_unit(name)
            }
            LedgerError::IllegalTransition { name, .. } => {
                SlError::new(SlErrorKind::IllegalTransition).with_unit(name)
            }
            LedgerError::EnqueueFailed { .. } => SlError::new(SlErrorKind::EnqueueFailed),
            LedgerError::InvalidInput { .. } => SlError::new(SlErrorKind::InvalidInput),
            LedgerError::Serialization { .. } => SlError::new(SlErrorKind::Serialization),
        }
        .with_message(message)
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SlError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::from(err).into()
    }
}
