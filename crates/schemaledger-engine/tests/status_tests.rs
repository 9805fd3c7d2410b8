// Integration tests for status and verify.

mod common;

use common::{name, setup_db, FnUnit};
use schemaledger_core::errors::SlErrorKind;
use schemaledger_core::registry::Registry;
use schemaledger_engine::{Runner, UnitStatus};

#[test]
fn test_status_lists_applied_pending_and_orphaned() {
    let (_tmp, mut conn) = setup_db();
    let old = Registry::new()
        .with(FnUnit::sql("m0_retired", "SELECT 1").boxed())
        .unwrap()
        .with(FnUnit::sql("m1", "SELECT 1").boxed())
        .unwrap();
    Runner::new(&old).apply_all(&mut conn).unwrap();

    let registry = Registry::new()
        .with(FnUnit::sql("m1", "SELECT 1").boxed())
        .unwrap()
        .with(FnUnit::sql("m2", "SELECT 1").boxed())
        .unwrap();
    let report = Runner::new(&registry).status(&conn).unwrap();

    let rows: Vec<(&str, &str)> = report
        .rows
        .iter()
        .map(|r| {
            let status = match &r.status {
                UnitStatus::Applied(_) => "applied",
                UnitStatus::Pending => "pending",
                UnitStatus::Orphaned(_) => "orphaned",
            };
            (r.name.as_str(), status)
        })
        .collect();
    assert_eq!(
        rows,
        vec![("m0_retired", "orphaned"), ("m1", "applied"), ("m2", "pending")]
    );
    assert_eq!(report.pending_count(), 1);
    assert!(report.gaps.is_empty());
}

#[test]
fn test_status_reports_gap_and_apply_fills_it() {
    let (_tmp, mut conn) = setup_db();
    let registry = Registry::new()
        .with(FnUnit::sql("m1", "SELECT 1").boxed())
        .unwrap()
        .with(FnUnit::sql("m2", "SELECT 1").boxed())
        .unwrap()
        .with(FnUnit::sql("m3", "SELECT 1").boxed())
        .unwrap();
    let runner = Runner::new(&registry);
    runner.mark_applied(&mut conn, &name("m2")).unwrap();

    assert_eq!(runner.status(&conn).unwrap().gaps, vec![name("m1")]);

    let report = runner.apply_all(&mut conn).unwrap();
    let applied: Vec<&str> = report.applied_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(applied, vec!["m1", "m3"]);
    assert!(runner.status(&conn).unwrap().gaps.is_empty());
}

#[test]
fn test_verify_passes_when_checksums_match() {
    let (_tmp, mut conn) = setup_db();
    let registry = Registry::new()
        .with(FnUnit::sql("m1", "SELECT 1").with_checksum("aaa").boxed())
        .unwrap()
        .with(FnUnit::sql("m2", "SELECT 1").boxed())
        .unwrap();
    let runner = Runner::new(&registry);
    runner.apply_all(&mut conn).unwrap();

    // m2 carries no checksum and is not compared.
    assert_eq!(runner.verify(&conn).unwrap(), 1);
}

#[test]
fn test_verify_detects_drift() {
    let (_tmp, mut conn) = setup_db();
    let before = Registry::new()
        .with(FnUnit::sql("m1", "SELECT 1").with_checksum("aaa").boxed())
        .unwrap()
        .with(FnUnit::sql("m2", "SELECT 1").with_checksum("bbb").boxed())
        .unwrap();
    Runner::new(&before).apply_all(&mut conn).unwrap();

    let edited = Registry::new()
        .with(FnUnit::sql("m1", "SELECT 2").with_checksum("ccc").boxed())
        .unwrap()
        .with(FnUnit::sql("m2", "SELECT 1").with_checksum("bbb").boxed())
        .unwrap();
    let err = Runner::new(&edited).verify(&conn).unwrap_err();

    assert_eq!(err.kind(), SlErrorKind::ChecksumMismatch);
    assert_eq!(err.unit(), Some("m1"));
}
