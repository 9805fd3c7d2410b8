//! `schemaledger.toml` loading
//!
//! ```toml
//! db_path = "var/app.db"
//! units_dir = "migrations"
//! busy_timeout_ms = 5000
//! log_profile = "production"
//! ```

use anyhow::{Context, Result};
use schemaledger_core::logging_facility::Profile;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "schemaledger.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    pub db_path: PathBuf,
    pub units_dir: PathBuf,
    pub busy_timeout_ms: u64,
    pub log_profile: Profile,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("schemaledger.db"),
            units_dir: PathBuf::from("migrations"),
            busy_timeout_ms: schemaledger_store::db::DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
            log_profile: Profile::Development,
        }
    }
}

impl LedgerConfig {
    /// Load from `path`, or from `./schemaledger.toml` when none is given
    ///
    /// An explicit path must exist. The default file is optional; without
    /// it every setting takes its default.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Command-line flags win over file values
    pub fn with_overrides(mut self, db: Option<PathBuf>, units: Option<PathBuf>) -> Self {
        if let Some(db) = db {
            self.db_path = db;
        }
        if let Some(units) = units {
            self.units_dir = units;
        }
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
