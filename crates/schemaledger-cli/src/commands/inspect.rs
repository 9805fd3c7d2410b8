//! `status` and `verify`

use super::{unexpected, Session};
use anyhow::Result;
use schemaledger_engine::{LedgerCommand, LedgerCommandResult, UnitStatus};

pub fn status(session: &mut Session) -> Result<()> {
    let report = match session.run(LedgerCommand::Status)? {
        LedgerCommandResult::Status(report) => report,
        other => return Err(unexpected(other)),
    };

    for row in &report.rows {
        match &row.status {
            UnitStatus::Applied(entry) => println!(
                "{:<9} {}  {}",
                entry.outcome.as_str(),
                row.name,
                entry.applied_at.format("%Y-%m-%d %H:%M:%S")
            ),
            UnitStatus::Pending => println!("{:<9} {}", "pending", row.name),
            UnitStatus::Orphaned(entry) => println!(
                "{:<9} {}  {}  (no unit file)",
                "orphaned",
                row.name,
                entry.applied_at.format("%Y-%m-%d %H:%M:%S")
            ),
        }
    }
    for gap in &report.gaps {
        println!("gap: {} is pending but ordered before applied units", gap);
    }
    Ok(())
}

pub fn verify(session: &mut Session) -> Result<()> {
    match session.run(LedgerCommand::Verify)? {
        LedgerCommandResult::Verified(checked) => {
            println!("{} checksum(s) verified", checked);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}
