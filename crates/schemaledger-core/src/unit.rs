//! The migration unit contract

use crate::errors::{LedgerError, Result};
use crate::executor::SchemaExecutor;
use crate::guard::Guard;
use crate::model::UnitName;
use crate::queue::Enqueuer;

/// Collaborators handed to a unit for one apply or revert
///
/// Both are scoped to the unit's transaction.
pub struct UnitContext<'a> {
    pub schema: &'a dyn SchemaExecutor,
    pub queue: &'a dyn Enqueuer,
}

impl<'a> UnitContext<'a> {
    pub fn new(schema: &'a dyn SchemaExecutor, queue: &'a dyn Enqueuer) -> Self {
        Self { schema, queue }
    }
}

/// One named, ordered schema change
///
/// Implementations must be deterministic and must not keep state between
/// calls; the name never changes once a unit has shipped.
pub trait MigrationUnit: Send + Sync {
    fn name(&self) -> &UnitName;

    /// Preconditions that make this unit a no-op when already satisfied
    fn guards(&self) -> &[Guard] {
        &[]
    }

    /// Content fingerprint recorded in the ledger, used to detect edits to
    /// units that have already shipped
    fn checksum(&self) -> Option<String> {
        None
    }

    /// Perform the change. Any error rolls back the unit and halts the run.
    fn apply(&self, ctx: &UnitContext<'_>) -> Result<()>;

    fn is_reversible(&self) -> bool {
        false
    }

    /// Undo the change. Forward-only units keep the default.
    fn revert(&self, _ctx: &UnitContext<'_>) -> Result<()> {
        Err(LedgerError::Irreversible {
            name: self.name().to_string(),
        }
        .into())
    }
}

impl std::fmt::Debug for dyn MigrationUnit + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationUnit")
            .field("name", self.name())
            .field("reversible", &self.is_reversible())
            .finish()
    }
}
