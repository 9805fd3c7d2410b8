//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use rusqlite::Connection;
use schemaledger_core::errors::{Result, SlError, SlErrorKind};
use schemaledger_core::guard::Guard;
use schemaledger_core::model::UnitName;
use schemaledger_core::unit::{MigrationUnit, UnitContext};
use schemaledger_store::db::{open_store, DEFAULT_BUSY_TIMEOUT};
use std::path::Path;
use tempfile::TempDir;

type Body = Box<dyn Fn(&UnitContext<'_>) -> Result<()> + Send + Sync>;

/// A unit whose body is a closure
pub struct FnUnit {
    name: UnitName,
    apply: Body,
    revert: Option<Body>,
    guards: Vec<Guard>,
    checksum: Option<String>,
}

impl FnUnit {
    pub fn new(
        name: &str,
        apply: impl Fn(&UnitContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: UnitName::new(name).unwrap(),
            apply: Box::new(apply),
            revert: None,
            guards: Vec::new(),
            checksum: None,
        }
    }

    /// Unit that runs one SQL batch
    pub fn sql(name: &str, sql: &'static str) -> Self {
        Self::new(name, move |ctx| ctx.schema.execute_batch(sql))
    }

    /// Unit that always fails after running `sql`
    pub fn failing(name: &str, sql: &'static str) -> Self {
        Self::new(name, move |ctx| {
            ctx.schema.execute_batch(sql)?;
            Err(SlError::new(SlErrorKind::Internal).with_message("backfill blew up"))
        })
    }

    pub fn with_revert_sql(mut self, sql: &'static str) -> Self {
        self.revert = Some(Box::new(move |ctx| ctx.schema.execute_batch(sql)));
        self
    }

    pub fn with_revert(
        mut self,
        revert: impl Fn(&UnitContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.revert = Some(Box::new(revert));
        self
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn with_checksum(mut self, checksum: &str) -> Self {
        self.checksum = Some(checksum.to_string());
        self
    }

    pub fn boxed(self) -> Box<dyn MigrationUnit> {
        Box::new(self)
    }
}

impl MigrationUnit for FnUnit {
    fn name(&self) -> &UnitName {
        &self.name
    }

    fn guards(&self) -> &[Guard] {
        &self.guards
    }

    fn checksum(&self) -> Option<String> {
        self.checksum.clone()
    }

    fn apply(&self, ctx: &UnitContext<'_>) -> Result<()> {
        (self.apply)(ctx)
    }

    fn is_reversible(&self) -> bool {
        self.revert.is_some()
    }

    fn revert(&self, ctx: &UnitContext<'_>) -> Result<()> {
        match &self.revert {
            Some(revert) => revert(ctx),
            None => Err(schemaledger_core::LedgerError::Irreversible {
                name: self.name.to_string(),
            }
            .into()),
        }
    }
}

pub fn name(s: &str) -> UnitName {
    UnitName::new(s).unwrap()
}

pub fn setup_db() -> (TempDir, Connection) {
    let temp_dir = TempDir::new().unwrap();
    let conn = open_db(&temp_dir.path().join("test.db"));
    (temp_dir, conn)
}

pub fn open_db(path: &Path) -> Connection {
    let conn = open_store(path, DEFAULT_BUSY_TIMEOUT).unwrap();
    conn.execute_batch("CREATE TABLE IF NOT EXISTS orders (id INTEGER PRIMARY KEY, total REAL)")
        .unwrap();
    conn
}

pub fn ledger_names(conn: &Connection) -> Vec<String> {
    schemaledger_store::ledger::entries(conn)
        .unwrap()
        .into_iter()
        .map(|e| e.name.to_string())
        .collect()
}
