use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};

const MAX_LEN: usize = 255;

/// Opaque, sortable identity of a migration unit
///
/// Units are applied in ascending byte-lexicographic order of their names.
/// The usual convention is a leading UTC timestamp
/// (`m20240117_093000_add_sku_index`) but nothing here parses it; the name
/// is compared as a whole.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitName(String);

impl UnitName {
    /// Validate and wrap a unit name
    ///
    /// # Errors
    ///
    /// `InvalidUnitName` if the name is empty, longer than 255 bytes, or
    /// contains characters outside `[A-Za-z0-9_.-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, LedgerError> {
        let name = name.into();
        if name.is_empty() {
            return Err(invalid(&name, "name is empty"));
        }
        if name.len() > MAX_LEN {
            return Err(invalid(&name, "name exceeds 255 bytes"));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        {
            return Err(invalid(&name, &format!("character {:?} not allowed", c)));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(name: &str, reason: &str) -> LedgerError {
    LedgerError::InvalidUnitName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

impl std::fmt::Display for UnitName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for UnitName {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UnitName {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnitName> for String {
    fn from(name: UnitName) -> Self {
        name.0
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
