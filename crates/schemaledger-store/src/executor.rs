//! SQLite implementation of the schema seam

use crate::errors::{from_rusqlite, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use schemaledger_core::executor::{SchemaExecutor, SqlValue};

/// Executes unit statements on one connection
///
/// Construct it over the unit's `Transaction` (which derefs to
/// `Connection`) so everything a unit does shares that transaction.
pub struct SqliteSchemaExecutor<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteSchemaExecutor<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

fn to_value(v: &SqlValue) -> Value {
    match v {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Integer(*i),
        SqlValue::Real(r) => Value::Real(*r),
        SqlValue::Text(s) => Value::Text(s.clone()),
    }
}

impl SchemaExecutor for SqliteSchemaExecutor<'_> {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<usize> {
        tracing::debug!(sql, "execute");
        self.conn
            .execute(sql, params_from_iter(params.iter().map(to_value)))
            .map_err(from_rusqlite)
    }

    fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql).map_err(from_rusqlite)
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |_| Ok(()),
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_some())
    }

    fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2",
                [table, column],
                |_| Ok(()),
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_some())
    }

    fn index_exists(&self, index: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?1",
                [index],
                |_| Ok(()),
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_some())
    }

    fn foreign_key_exists(&self, table: &str, column: &str, ref_table: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM pragma_foreign_key_list(?1)
                 WHERE \"from\" = ?2 AND \"table\" = ?3",
                [table, column, ref_table],
                |_| Ok(()),
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_some())
    }
}
