use crate::errors::LedgerError;
use crate::model::UnitName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a ledger entry came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOutcome {
    /// The unit's apply operation ran and committed
    Applied,
    /// A guard tripped; the unit completed as a no-op
    Skipped,
    /// Recorded by an operator without running the unit
    Marked,
}

impl EntryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryOutcome::Applied => "applied",
            EntryOutcome::Skipped => "skipped",
            EntryOutcome::Marked => "marked",
        }
    }
}

impl std::str::FromStr for EntryOutcome {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(EntryOutcome::Applied),
            "skipped" => Ok(EntryOutcome::Skipped),
            "marked" => Ok(EntryOutcome::Marked),
            other => Err(LedgerError::InvalidInput {
                reason: format!("unknown ledger outcome {:?}", other),
            }),
        }
    }
}

impl std::fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only record that a unit has been applied
///
/// Written once, in the same transaction as the unit's schema change.
/// Never updated; deleted only by revert or manual repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub name: UnitName,
    pub applied_at: DateTime<Utc>,
    /// Unit checksum at the time it was applied, if the unit has one
    pub checksum: Option<String>,
    pub outcome: EntryOutcome,
}

impl LedgerEntry {
    pub fn new(name: UnitName, checksum: Option<String>, outcome: EntryOutcome) -> Self {
        Self {
            name,
            applied_at: Utc::now(),
            checksum,
            outcome,
        }
    }
}
