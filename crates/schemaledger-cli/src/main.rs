//! SchemaLedger CLI
//!
//! Command-line interface for the migration ledger runner

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use config::LedgerConfig;

#[derive(Debug, Parser)]
#[command(name = "schemaledger")]
#[command(about = "SchemaLedger - ordered, recorded schema migrations", long_about = None)]
struct Cli {
    /// Config file (default: ./schemaledger.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path, overriding the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory of <name>.up.sql / <name>.down.sql units, overriding the config file
    #[arg(long, global = true)]
    units: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List units not yet in the ledger, in application order
    Pending,
    /// Apply every pending unit, stopping at the first failure
    Apply,
    /// Show every unit and ledger entry
    Status,
    /// Compare ledger checksums with the unit files
    Verify,
    /// Run a unit's down file and remove its ledger entry
    Revert(commands::repair::NameArgs),
    /// Record a unit as applied without running it
    MarkApplied(commands::repair::NameArgs),
    /// Remove a unit's ledger entry without running its down file
    MarkReverted(commands::repair::NameArgs),
}

fn run(cli: Cli) -> Result<()> {
    let config = LedgerConfig::load(cli.config.as_deref())?.with_overrides(cli.db, cli.units);
    schemaledger_core::logging_facility::init(config.log_profile);

    let mut session = commands::Session::open(&config)?;
    match cli.command {
        Commands::Pending => commands::apply::pending(&mut session),
        Commands::Apply => commands::apply::apply(&mut session),
        Commands::Status => commands::inspect::status(&mut session),
        Commands::Verify => commands::inspect::verify(&mut session),
        Commands::Revert(args) => commands::repair::revert(&mut session, args),
        Commands::MarkApplied(args) => commands::repair::mark_applied(&mut session, args),
        Commands::MarkReverted(args) => commands::repair::mark_reverted(&mut session, args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
