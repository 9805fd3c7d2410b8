//! `revert`, `mark-applied` and `mark-reverted`

use super::{unexpected, Session};
use anyhow::Result;
use clap::Args;
use schemaledger_core::model::UnitName;
use schemaledger_engine::{LedgerCommand, LedgerCommandResult};

#[derive(Debug, Args)]
pub struct NameArgs {
    /// Unit name (file name without .up.sql)
    pub name: String,
}

impl NameArgs {
    fn unit_name(&self) -> Result<UnitName> {
        Ok(UnitName::new(self.name.as_str())?)
    }
}

pub fn revert(session: &mut Session, args: NameArgs) -> Result<()> {
    let name = args.unit_name()?;
    match session.run(LedgerCommand::Revert { name })? {
        LedgerCommandResult::Reverted(name) => {
            println!("reverted {}", name);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

pub fn mark_applied(session: &mut Session, args: NameArgs) -> Result<()> {
    let name = args.unit_name()?;
    match session.run(LedgerCommand::MarkApplied { name })? {
        LedgerCommandResult::Marked(entry) => {
            println!("marked {} applied", entry.name);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

pub fn mark_reverted(session: &mut Session, args: NameArgs) -> Result<()> {
    let name = args.unit_name()?;
    match session.run(LedgerCommand::MarkReverted { name })? {
        LedgerCommandResult::Unmarked(name) => {
            println!("marked {} reverted", name);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}
