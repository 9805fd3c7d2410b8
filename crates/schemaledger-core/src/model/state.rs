use crate::errors::LedgerError;

/// Lifecycle of a single unit within the runner
///
/// ```text
/// Pending -> Applying -> Applied
///                     -> Failed -> Applying   (operator re-run)
/// Applied -> Pending                          (revert / mark-reverted)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    Applying,
    Applied,
    Failed,
}

impl UnitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitState::Pending => "pending",
            UnitState::Applying => "applying",
            UnitState::Applied => "applied",
            UnitState::Failed => "failed",
        }
    }

    pub fn can_transition_to(&self, next: UnitState) -> bool {
        use UnitState::*;
        matches!(
            (self, next),
            (Pending, Applying)
                | (Applying, Applied)
                | (Applying, Failed)
                | (Failed, Applying)
                | (Applied, Pending)
        )
    }

    /// Move to `next`, or report the illegal edge for unit `name`
    pub fn transition(self, name: &str, next: UnitState) -> Result<UnitState, LedgerError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(LedgerError::IllegalTransition {
                name: name.to_string(),
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl std::fmt::Display for UnitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
