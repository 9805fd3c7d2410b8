//! Ordered collection of every known unit

use crate::errors::{LedgerError, Result};
use crate::model::UnitName;
use crate::unit::MigrationUnit;
use std::collections::BTreeMap;

/// All units known to this build, keyed and iterated by name
#[derive(Default)]
pub struct Registry {
    units: BTreeMap<UnitName, Box<dyn MigrationUnit>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit
    ///
    /// # Errors
    ///
    /// `DuplicateUnit` if a unit with the same name is already registered.
    pub fn register(&mut self, unit: Box<dyn MigrationUnit>) -> Result<()> {
        let name = unit.name().clone();
        if self.units.contains_key(&name) {
            return Err(LedgerError::DuplicateUnit {
                name: name.to_string(),
            }
            .into());
        }
        self.units.insert(name, unit);
        Ok(())
    }

    /// Builder-style `register`
    pub fn with(mut self, unit: Box<dyn MigrationUnit>) -> Result<Self> {
        self.register(unit)?;
        Ok(self)
    }

    pub fn get(&self, name: &UnitName) -> Option<&dyn MigrationUnit> {
        self.units.get(name).map(|u| u.as_ref())
    }

    pub fn contains(&self, name: &UnitName) -> bool {
        self.units.contains_key(name)
    }

    /// Units in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = &dyn MigrationUnit> {
        self.units.values().map(|u| u.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &UnitName> {
        self.units.keys()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.units.keys()).finish()
    }
}
