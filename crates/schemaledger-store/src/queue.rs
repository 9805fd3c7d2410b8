//! SQLite-backed job queue
//!
//! The default `Enqueuer`: jobs become rows in `job_queue`, written in the
//! unit's transaction. A rolled-back unit therefore leaves no jobs behind,
//! and a committed one leaves exactly its jobs for the host to drain.

use crate::errors::{from_rusqlite, Result};
use rusqlite::{params, Connection};
use schemaledger_core::errors::{LedgerError, SlError};
use schemaledger_core::model::{Job, UnitName};
use schemaledger_core::queue::Enqueuer;

pub struct SqliteJobQueue<'c> {
    conn: &'c Connection,
    unit: Option<UnitName>,
}

impl<'c> SqliteJobQueue<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn, unit: None }
    }

    /// Tag every job with the unit that enqueued it
    pub fn for_unit(conn: &'c Connection, unit: &UnitName) -> Self {
        Self {
            conn,
            unit: Some(unit.clone()),
        }
    }
}

impl Enqueuer for SqliteJobQueue<'_> {
    fn enqueue(&self, job: &Job) -> Result<()> {
        let payload = serde_json::to_string(&job.payload)?;
        self.conn
            .execute(
                "INSERT INTO job_queue (unit_name, kind, payload, enqueued_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    self.unit.as_ref().map(UnitName::as_str),
                    job.kind,
                    payload,
                    chrono::Utc::now().timestamp_millis(),
                ],
            )
            .map_err(|e| {
                SlError::from(LedgerError::EnqueueFailed {
                    job_kind: job.kind.clone(),
                    reason: e.to_string(),
                })
            })?;
        Ok(())
    }
}

/// A job row as the host sees it
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedJob {
    pub id: i64,
    pub unit: Option<String>,
    pub job: Job,
}

/// Every queued job, oldest first
pub fn list_jobs(conn: &Connection) -> Result<Vec<QueuedJob>> {
    let mut stmt = conn
        .prepare("SELECT id, unit_name, kind, payload FROM job_queue ORDER BY id")
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    rows.into_iter()
        .map(|(id, unit, kind, payload)| -> Result<QueuedJob> {
            Ok(QueuedJob {
                id,
                unit,
                job: Job::new(kind, serde_json::from_str(&payload)?),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enqueue_then_list() {
        let mut conn = Connection::open_in_memory().unwrap();
        crate::bootstrap::bootstrap(&mut conn).unwrap();
        let unit = UnitName::new("m20240101_000000_resave_products").unwrap();

        let queue = SqliteJobQueue::for_unit(&conn, &unit);
        queue
            .enqueue(&Job::new("resave_elements", json!({"type": "product"})))
            .unwrap();
        SqliteJobQueue::new(&conn)
            .enqueue(&Job::new("rebuild_search", json!(null)))
            .unwrap();

        let jobs = list_jobs(&conn).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].unit.as_deref(), Some(unit.as_str()));
        assert_eq!(jobs[0].job.payload, json!({"type": "product"}));
        assert_eq!(jobs[1].unit, None);
        assert_eq!(jobs[1].job.kind, "rebuild_search");
    }

    #[test]
    fn test_enqueue_without_table_fails() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteJobQueue::new(&conn)
            .enqueue(&Job::new("resave_elements", json!({})))
            .unwrap_err();
        assert_eq!(err.kind(), schemaledger_core::SlErrorKind::EnqueueFailed);
    }
}
