// Integration tests for runners racing on one database file.

mod common;

use common::{ledger_names, name, open_db, FnUnit};
use schemaledger_core::registry::Registry;
use schemaledger_core::SchemaExecutor;
use schemaledger_engine::{Runner, UnitOutcome};
use schemaledger_store::executor::SqliteSchemaExecutor;
use tempfile::TempDir;

fn counting_registry() -> Registry {
    let mut registry = Registry::new();
    for n in ["m1_a", "m2_b", "m3_c", "m4_d"] {
        registry
            .register(
                FnUnit::new(n, move |ctx| {
                    ctx.schema
                        .execute("INSERT INTO unit_runs (unit) VALUES (?1)", &[n.into()])?;
                    Ok(())
                })
                .boxed(),
            )
            .unwrap();
    }
    registry
}

fn setup_shared() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shared.db");
    let conn = open_db(&path);
    conn.execute_batch("CREATE TABLE unit_runs (unit TEXT NOT NULL)")
        .unwrap();
    (temp_dir, path)
}

#[test]
fn test_stale_pending_list_yields_applied_elsewhere() {
    let (_tmp, path) = setup_shared();
    let registry = counting_registry();
    let mut conn_a = open_db(&path);
    let mut conn_b = open_db(&path);

    let runner_a = Runner::new(&registry);
    let stale = runner_a.list_pending(&conn_a).unwrap();
    assert_eq!(stale.len(), 4);

    Runner::new(&registry).apply_all(&mut conn_b).unwrap();

    let report = runner_a.apply_units(&mut conn_a, &stale).unwrap();
    assert_eq!(report.applied_count(), 0);
    assert_eq!(report.conflicts().len(), 4);
    assert!(report
        .outcomes
        .iter()
        .all(|(_, o)| *o == UnitOutcome::AppliedElsewhere));

    let runs: i64 = conn_a
        .query_row("SELECT COUNT(*) FROM unit_runs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(runs, 4);
}

#[test]
fn test_parallel_runners_apply_each_unit_once() {
    let (_tmp, path) = setup_shared();
    let registry = counting_registry();

    let reports: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let path = path.clone();
                let registry = &registry;
                s.spawn(move || {
                    let mut conn = open_db(&path);
                    Runner::new(registry).apply_all(&mut conn).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let applied: usize = reports.iter().map(|r| r.applied_count()).sum();
    assert_eq!(applied, 4);

    let conn = open_db(&path);
    assert_eq!(ledger_names(&conn), vec!["m1_a", "m2_b", "m3_c", "m4_d"]);
    let runs: i64 = conn
        .query_row("SELECT COUNT(*) FROM unit_runs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(runs, 4);
}

#[test]
fn test_parallel_runners_on_fresh_database() {
    let registry = Registry::new()
        .with(FnUnit::sql("m1_discount", "ALTER TABLE orders ADD COLUMN discount REAL").boxed())
        .unwrap()
        .with(FnUnit::sql("m2_index", "CREATE INDEX idx_orders_total ON orders (total)").boxed())
        .unwrap();

    for round in 0..5 {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fresh.db");

        let reports: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let path = &path;
                    let registry = &registry;
                    s.spawn(move || {
                        let mut conn = open_db(path);
                        Runner::new(registry).apply_all(&mut conn).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let applied: usize = reports.iter().map(|r| r.applied_count()).sum();
        assert_eq!(applied, 2, "round {}", round);
        let conn = open_db(&path);
        assert_eq!(ledger_names(&conn), vec!["m1_discount", "m2_index"]);
    }
}

#[test]
fn test_lost_ledger_insert_rolls_back_and_run_continues() {
    let (_tmp, path) = setup_shared();
    // Writes its own ledger row mid-transaction, so the runner's insert
    // collides exactly as it would against a runner that committed first.
    let registry = Registry::new()
        .with(
            FnUnit::new("m1_contested", |ctx| {
                ctx.schema
                    .execute_batch("ALTER TABLE orders ADD COLUMN discount REAL")?;
                ctx.schema.execute(
                    "INSERT INTO schema_ledger (unit_name, applied_at, checksum, outcome)
                     VALUES (?1, 0, NULL, 'applied')",
                    &["m1_contested".into()],
                )?;
                Ok(())
            })
            .boxed(),
        )
        .unwrap()
        .with(FnUnit::sql("m2_next", "CREATE TABLE refunds (id INTEGER PRIMARY KEY)").boxed())
        .unwrap();
    let mut conn = open_db(&path);

    let report = Runner::new(&registry).apply_all(&mut conn).unwrap();

    assert_eq!(
        report.outcomes,
        vec![
            (name("m1_contested"), UnitOutcome::AppliedElsewhere),
            (name("m2_next"), UnitOutcome::Applied),
        ]
    );
    assert_eq!(report.applied_count(), 1);
    assert_eq!(report.conflicts().len(), 1);

    let schema = SqliteSchemaExecutor::new(&conn);
    assert!(!schema.column_exists("orders", "discount").unwrap());
    assert!(schema.table_exists("refunds").unwrap());
    assert_eq!(ledger_names(&conn), vec!["m2_next"]);
}
