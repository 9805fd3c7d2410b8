//! CLI integration tests
//!
//! Drive the built binary against a scratch database and units directory.

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn setup_project(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
    let db_path = temp_dir.path().join("app.db");
    let units = temp_dir.path().join("units");
    fs::create_dir_all(&units).unwrap();

    fs::write(
        units.join("m1_create_orders.up.sql"),
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, total REAL);",
    )
    .unwrap();
    fs::write(units.join("m1_create_orders.down.sql"), "DROP TABLE orders;").unwrap();
    fs::write(
        units.join("m2_add_discount.up.sql"),
        "-- @skip-if column-exists orders.discount\n\
         -- @enqueue resave_elements {\"type\": \"order\"}\n\
         ALTER TABLE orders ADD COLUMN discount REAL NOT NULL DEFAULT 0;",
    )
    .unwrap();

    (db_path, units)
}

fn run_cli(temp_dir: &TempDir, db: &Path, units: &Path, args: &[&str]) -> Output {
    let cli_bin = env!("CARGO_BIN_EXE_schemaledger-cli");
    Command::new(cli_bin)
        .current_dir(temp_dir.path())
        .env("RUST_LOG", "off")
        .arg("--db")
        .arg(db)
        .arg("--units")
        .arg(units)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_cli_pending_then_apply() {
    let temp_dir = TempDir::new().unwrap();
    let (db, units) = setup_project(&temp_dir);

    let output = run_cli(&temp_dir, &db, &units, &["pending"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "m1_create_orders\nm2_add_discount\n");

    let output = run_cli(&temp_dir, &db, &units, &["apply"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("2 unit(s) applied"));

    let conn = Connection::open(&db).unwrap();
    let jobs: i64 = conn
        .query_row("SELECT COUNT(*) FROM job_queue", [], |r| r.get(0))
        .unwrap();
    assert_eq!(jobs, 1);

    let output = run_cli(&temp_dir, &db, &units, &["apply"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("0 unit(s) applied"));

    let output = run_cli(&temp_dir, &db, &units, &["pending"]);
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_cli_failed_unit_exits_nonzero_with_unit_name() {
    let temp_dir = TempDir::new().unwrap();
    let (db, units) = setup_project(&temp_dir);
    fs::write(
        units.join("m3_broken.up.sql"),
        "ALTER TABLE no_such_table ADD COLUMN x INTEGER;",
    )
    .unwrap();

    let output = run_cli(&temp_dir, &db, &units, &["apply"]);

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("unit m3_broken:"),
        "stderr: {}",
        stderr(&output)
    );

    let conn = Connection::open(&db).unwrap();
    let recorded: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_ledger", [], |r| r.get(0))
        .unwrap();
    assert_eq!(recorded, 2);
}

#[test]
fn test_cli_failure_prints_cause_once() {
    let temp_dir = TempDir::new().unwrap();
    let (db, units) = setup_project(&temp_dir);
    fs::write(
        units.join("m3_broken.up.sql"),
        "ALTER TABLE no_such_table ADD COLUMN x INTEGER;",
    )
    .unwrap();

    let output = run_cli(&temp_dir, &db, &units, &["apply"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert_eq!(err.matches("no such table").count(), 1, "stderr: {}", err);
}

#[test]
fn test_cli_revert_and_irreversible() {
    let temp_dir = TempDir::new().unwrap();
    let (db, units) = setup_project(&temp_dir);
    assert!(run_cli(&temp_dir, &db, &units, &["apply"]).status.success());

    let output = run_cli(&temp_dir, &db, &units, &["revert", "m2_add_discount"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unit m2_add_discount:"));

    // Drop m2's entry so m1's down file can run cleanly.
    let output = run_cli(&temp_dir, &db, &units, &["mark-reverted", "m2_add_discount"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_cli(&temp_dir, &db, &units, &["revert", "m1_create_orders"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "reverted m1_create_orders\n");
}

#[test]
fn test_cli_mark_applied_and_status() {
    let temp_dir = TempDir::new().unwrap();
    let (db, units) = setup_project(&temp_dir);

    let output = run_cli(&temp_dir, &db, &units, &["mark-applied", "m2_add_discount"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_cli(&temp_dir, &db, &units, &["status"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("pending   m1_create_orders"));
    assert!(out.contains("marked    m2_add_discount"));
    assert!(out.contains("gap: m1_create_orders"));

    let output = run_cli(&temp_dir, &db, &units, &["verify"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1 checksum(s) verified\n");
}

#[test]
fn test_cli_verify_detects_edited_unit() {
    let temp_dir = TempDir::new().unwrap();
    let (db, units) = setup_project(&temp_dir);
    assert!(run_cli(&temp_dir, &db, &units, &["apply"]).status.success());

    fs::write(
        units.join("m1_create_orders.up.sql"),
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, total REAL, note TEXT);",
    )
    .unwrap();

    let output = run_cli(&temp_dir, &db, &units, &["verify"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unit m1_create_orders:"));
}

#[test]
fn test_cli_reads_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let (db, units) = setup_project(&temp_dir);
    fs::write(
        temp_dir.path().join("schemaledger.toml"),
        format!(
            "db_path = {:?}\nunits_dir = {:?}\nlog_profile = \"production\"\n",
            db.to_str().unwrap(),
            units.to_str().unwrap()
        ),
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_schemaledger-cli"))
        .current_dir(temp_dir.path())
        .env("RUST_LOG", "off")
        .arg("pending")
        .output()
        .expect("Failed to execute CLI");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "m1_create_orders\nm2_add_discount\n");
}

#[test]
fn test_cli_invalid_unit_name_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let (db, units) = setup_project(&temp_dir);

    let output = run_cli(&temp_dir, &db, &units, &["mark-applied", "bad name"]);
    assert!(!output.status.success());
}
