//! Units authored as SQL files
//!
//! A units directory holds `<name>.up.sql` and optional `<name>.down.sql`.
//! Comment directives at the top of the up file declare guards and
//! follow-up jobs:
//!
//! ```text
//! -- @skip-if column-exists orders.discount_total
//! -- @enqueue resave_elements {"type": "order"}
//! ALTER TABLE orders ADD COLUMN discount_total REAL NOT NULL DEFAULT 0;
//! ```

use crate::checksum::compute_checksum;
use crate::errors::{io_error, unit_file_error, Result};
use schemaledger_core::errors::Result as CoreResult;
use schemaledger_core::guard::Guard;
use schemaledger_core::model::{Job, UnitName};
use schemaledger_core::registry::Registry;
use schemaledger_core::unit::{MigrationUnit, UnitContext};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const UP_SUFFIX: &str = ".up.sql";
const DOWN_SUFFIX: &str = ".down.sql";
const DIRECTIVE_PREFIX: &str = "-- @";

#[derive(Debug, Clone)]
pub struct SqlUnit {
    name: UnitName,
    up: String,
    down: Option<String>,
    guards: Vec<Guard>,
    jobs: Vec<Job>,
    checksum: String,
}

impl SqlUnit {
    /// Build a unit from SQL text, parsing directives out of `up`
    ///
    /// `origin` names the source in error messages.
    pub fn parse(name: UnitName, up: String, down: Option<String>, origin: &str) -> Result<Self> {
        let mut guards = Vec::new();
        let mut jobs = Vec::new();

        for (lineno, line) in up.lines().enumerate() {
            let Some(directive) = line.trim().strip_prefix(DIRECTIVE_PREFIX) else {
                continue;
            };
            let at = format!("{}:{}", origin, lineno + 1);
            match directive.split_once(char::is_whitespace) {
                Some(("skip-if", rest)) => guards.push(parse_guard(rest.trim(), &at)?),
                Some(("enqueue", rest)) => jobs.push(parse_job(rest.trim(), &at)?),
                _ => {
                    return Err(unit_file_error(
                        &at,
                        &format!("unknown directive {:?}", directive),
                    ))
                }
            }
        }

        let checksum = compute_checksum(&up);
        Ok(Self {
            name,
            up,
            down,
            guards,
            jobs,
            checksum,
        })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }
}

fn split_qualified<'a>(s: &'a str, at: &str) -> Result<(&'a str, &'a str)> {
    s.split_once('.')
        .filter(|(t, c)| !t.is_empty() && !c.is_empty())
        .ok_or_else(|| unit_file_error(at, &format!("expected <table>.<column>, got {:?}", s)))
}

fn single_arg<'a>(args: &[&'a str], at: &str, what: &str) -> Result<&'a str> {
    match args {
        [one] => Ok(*one),
        _ => Err(unit_file_error(at, &format!("expected one {} argument", what))),
    }
}

fn parse_guard(args_text: &str, at: &str) -> Result<Guard> {
    let mut parts = args_text.split_whitespace();
    let kind = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match kind {
        "table-exists" => Ok(Guard::table_exists(single_arg(&args, at, "table")?)),
        "table-missing" => Ok(Guard::table_missing(single_arg(&args, at, "table")?)),
        "index-exists" => Ok(Guard::index_exists(single_arg(&args, at, "index")?)),
        "index-missing" => Ok(Guard::index_missing(single_arg(&args, at, "index")?)),
        "column-exists" => {
            let (table, column) = split_qualified(single_arg(&args, at, "column")?, at)?;
            Ok(Guard::column_exists(table, column))
        }
        "column-missing" => {
            let (table, column) = split_qualified(single_arg(&args, at, "column")?, at)?;
            Ok(Guard::column_missing(table, column))
        }
        "foreign-key-exists" => match args.as_slice() {
            [qualified, "->", ref_table] => {
                let (table, column) = split_qualified(qualified, at)?;
                Ok(Guard::foreign_key_exists(table, column, *ref_table))
            }
            _ => Err(unit_file_error(
                at,
                "expected foreign-key-exists <table>.<column> -> <ref_table>",
            )),
        },
        other => Err(unit_file_error(at, &format!("unknown guard {:?}", other))),
    }
}

fn parse_job(args_text: &str, at: &str) -> Result<Job> {
    let (kind, payload) = match args_text.split_once(char::is_whitespace) {
        Some((kind, payload)) => (kind, payload.trim()),
        None => (args_text, "null"),
    };
    if kind.is_empty() {
        return Err(unit_file_error(at, "enqueue needs a job kind"));
    }
    let payload = serde_json::from_str(payload)
        .map_err(|e| unit_file_error(at, &format!("bad job payload: {}", e)))?;
    Ok(Job::new(kind, payload))
}

impl MigrationUnit for SqlUnit {
    fn name(&self) -> &UnitName {
        &self.name
    }

    fn guards(&self) -> &[Guard] {
        &self.guards
    }

    fn checksum(&self) -> Option<String> {
        Some(self.checksum.clone())
    }

    fn apply(&self, ctx: &UnitContext<'_>) -> CoreResult<()> {
        ctx.schema.execute_batch(&self.up)?;
        for job in &self.jobs {
            ctx.queue.enqueue(job)?;
        }
        Ok(())
    }

    fn is_reversible(&self) -> bool {
        self.down.is_some()
    }

    fn revert(&self, ctx: &UnitContext<'_>) -> CoreResult<()> {
        match &self.down {
            Some(down) => ctx.schema.execute_batch(down),
            None => Err(schemaledger_core::LedgerError::Irreversible {
                name: self.name.to_string(),
            }
            .into()),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| io_error("read_unit_file", e))
}

/// Load every unit in `dir`, sorted by name
pub fn load_dir(dir: &Path) -> Result<Vec<SqlUnit>> {
    let mut ups: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut downs: BTreeMap<String, PathBuf> = BTreeMap::new();

    let entries = std::fs::read_dir(dir).map_err(|e| io_error("read_units_dir", e))?;
    for entry in entries {
        let path = entry.map_err(|e| io_error("read_units_dir", e))?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(stem) = file_name.strip_suffix(UP_SUFFIX) {
            ups.insert(stem.to_string(), path.clone());
        } else if let Some(stem) = file_name.strip_suffix(DOWN_SUFFIX) {
            downs.insert(stem.to_string(), path.clone());
        }
    }

    if let Some((stem, path)) = downs.iter().find(|(stem, _)| !ups.contains_key(*stem)) {
        return Err(unit_file_error(
            &path.display().to_string(),
            &format!("no matching {}{}", stem, UP_SUFFIX),
        ));
    }

    let mut units = Vec::with_capacity(ups.len());
    for (stem, up_path) in ups {
        let origin = up_path.display().to_string();
        let name = UnitName::new(stem.as_str())
            .map_err(|e| unit_file_error(&origin, &e.to_string()))?;
        let down = downs.get(&stem).map(|p| read(p)).transpose()?;
        units.push(SqlUnit::parse(name, read(&up_path)?, down, &origin)?);
    }

    tracing::debug!(dir = %dir.display(), count = units.len(), "units loaded");
    Ok(units)
}

/// Load `dir` into a fresh registry
pub fn load_registry(dir: &Path) -> Result<Registry> {
    let mut registry = Registry::new();
    for unit in load_dir(dir)? {
        registry.register(Box::new(unit))?;
    }
    Ok(registry)
}
