//! The migration ledger runner
//!
//! `Runner` binds a unit registry to a run id and, optionally, a host
//! `Enqueuer`. Its operations live in `commands::*`, one module per
//! concern; each takes the connection explicitly so the caller decides
//! which database (and which process) a run talks to.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use schemaledger_core::errors::{LedgerError, Result};
use schemaledger_core::model::UnitName;
use schemaledger_core::queue::Enqueuer;
use schemaledger_core::registry::Registry;
use schemaledger_core::unit::MigrationUnit;
use schemaledger_core_types::RunId;
use schemaledger_store::errors::from_rusqlite;

pub struct Runner<'r> {
    registry: &'r Registry,
    enqueuer: Option<&'r dyn Enqueuer>,
    run_id: RunId,
}

impl<'r> Runner<'r> {
    /// Runner over `registry` that queues follow-up jobs in the store's
    /// own `job_queue` table
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            enqueuer: None,
            run_id: RunId::new(),
        }
    }

    /// Hand follow-up jobs to a host queue instead
    ///
    /// Jobs submitted this way are not part of the unit's transaction: a
    /// unit that enqueues and then fails leaves its jobs submitted.
    pub fn with_enqueuer(mut self, enqueuer: &'r dyn Enqueuer) -> Self {
        self.enqueuer = Some(enqueuer);
        self
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub(crate) fn enqueuer(&self) -> Option<&'r dyn Enqueuer> {
        self.enqueuer
    }

    pub(crate) fn lookup(&self, name: &UnitName) -> Result<&'r dyn MigrationUnit> {
        self.registry.get(name).ok_or_else(|| {
            LedgerError::UnitNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }
}

/// Begin a unit transaction
///
/// IMMEDIATE takes the write lock up front, so a second runner blocks
/// (up to the busy timeout) before it reads the ledger rather than after
/// it has already issued DDL.
pub(crate) fn begin_unit_tx(conn: &mut Connection) -> Result<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)
}
