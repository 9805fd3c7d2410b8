//! `pending` and `apply`

use super::{unexpected, Session};
use anyhow::Result;
use schemaledger_engine::{LedgerCommand, LedgerCommandResult, UnitOutcome};

pub fn pending(session: &mut Session) -> Result<()> {
    match session.run(LedgerCommand::ListPending)? {
        LedgerCommandResult::Pending(names) => {
            for name in names {
                println!("{}", name);
            }
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

pub fn apply(session: &mut Session) -> Result<()> {
    match session.run(LedgerCommand::ApplyAll)? {
        LedgerCommandResult::Applied(report) => {
            for (name, outcome) in &report.outcomes {
                match outcome {
                    UnitOutcome::Applied => println!("applied  {}", name),
                    UnitOutcome::Skipped { reason } => println!("skipped  {} ({})", name, reason),
                    UnitOutcome::AppliedElsewhere => {
                        println!("already  {} (applied by another runner)", name)
                    }
                }
            }
            println!("{} unit(s) applied", report.applied_count());
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}
