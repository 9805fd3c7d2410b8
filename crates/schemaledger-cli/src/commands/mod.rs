//! Subcommand handlers
//!
//! Each handler builds a `LedgerCommand`, runs it through the engine and
//! prints the result to stdout.

pub mod apply;
pub mod inspect;
pub mod repair;

use crate::config::LedgerConfig;
use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use schemaledger_core::registry::Registry;
use schemaledger_engine::{
    apply_ledger_command, CommandError, LedgerCommand, LedgerCommandResult, Runner,
};

/// Registry loaded from the units directory plus an open store
pub struct Session {
    registry: Registry,
    conn: Connection,
}

impl Session {
    pub fn open(config: &LedgerConfig) -> Result<Self> {
        let registry = schemaledger_store::sql_unit::load_registry(&config.units_dir)
            .with_context(|| format!("loading units from {}", config.units_dir.display()))?;

        if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let conn = schemaledger_store::db::open_store(&config.db_path, config.busy_timeout())
            .with_context(|| format!("opening {}", config.db_path.display()))?;

        Ok(Self { registry, conn })
    }

    pub fn run(&mut self, cmd: LedgerCommand) -> Result<LedgerCommandResult> {
        let runner = Runner::new(&self.registry);
        apply_ledger_command(cmd, &runner, &mut self.conn).map_err(describe)
    }
}

/// Render failures as `unit <name>: <cause>` where a unit is involved
fn describe(err: CommandError) -> anyhow::Error {
    match err {
        CommandError::Ledger(e) => match e.unit().map(str::to_string) {
            Some(unit) => anyhow!("unit {}: {}", unit, e),
            None => anyhow::Error::new(e),
        },
        run @ CommandError::Run(_) => anyhow::Error::new(run),
    }
}

fn unexpected(result: LedgerCommandResult) -> anyhow::Error {
    anyhow!("unexpected engine result: {:?}", result)
}
