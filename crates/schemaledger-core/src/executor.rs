//! Schema execution seam
//!
//! `SchemaExecutor` is the narrow surface a unit body sees of the host
//! database: statement execution plus the introspection queries guards need.
//! Implementations are bound to the unit's transaction, so everything issued
//! through one commits or rolls back with the ledger entry.

use crate::errors::Result;

/// A bound statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Quote an identifier for interpolation into DDL
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Statement execution and schema introspection for unit bodies
pub trait SchemaExecutor {
    /// Execute one statement, returning the number of rows changed
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<usize>;

    /// Execute several `;`-separated statements without parameters
    fn execute_batch(&self, sql: &str) -> Result<()>;

    fn table_exists(&self, table: &str) -> Result<bool>;

    fn column_exists(&self, table: &str, column: &str) -> Result<bool>;

    fn index_exists(&self, index: &str) -> Result<bool>;

    /// True if `table.column` references `ref_table`
    fn foreign_key_exists(&self, table: &str, column: &str, ref_table: &str) -> Result<bool>;

    /// Add a column unless it is already there. Returns whether it was added.
    ///
    /// `definition` is everything after the column name, e.g.
    /// `"INTEGER NOT NULL DEFAULT 0"`.
    fn add_column_if_missing(&self, table: &str, column: &str, definition: &str) -> Result<bool> {
        if self.column_exists(table, column)? {
            return Ok(false);
        }
        self.execute(
            &format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                quote_ident(table),
                quote_ident(column),
                definition
            ),
            &[],
        )?;
        Ok(true)
    }

    /// Drop a column if present. Returns whether it was dropped.
    fn drop_column_if_exists(&self, table: &str, column: &str) -> Result<bool> {
        if !self.column_exists(table, column)? {
            return Ok(false);
        }
        self.execute(
            &format!(
                "ALTER TABLE {} DROP COLUMN {}",
                quote_ident(table),
                quote_ident(column)
            ),
            &[],
        )?;
        Ok(true)
    }

    /// Create an index unless one with this name exists. Returns whether it was created.
    fn create_index_if_missing(
        &self,
        index: &str,
        table: &str,
        columns: &[&str],
        unique: bool,
    ) -> Result<bool> {
        if self.index_exists(index)? {
            return Ok(false);
        }
        let cols = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        self.execute(
            &format!(
                "CREATE {}INDEX {} ON {} ({})",
                if unique { "UNIQUE " } else { "" },
                quote_ident(index),
                quote_ident(table),
                cols
            ),
            &[],
        )?;
        Ok(true)
    }

    /// Drop an index if present. Returns whether it was dropped.
    fn drop_index_if_exists(&self, index: &str) -> Result<bool> {
        if !self.index_exists(index)? {
            return Ok(false);
        }
        self.execute(&format!("DROP INDEX {}", quote_ident(index)), &[])?;
        Ok(true)
    }

    fn rename_column(&self, table: &str, from: &str, to: &str) -> Result<()> {
        self.execute(
            &format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                quote_ident(table),
                quote_ident(from),
                quote_ident(to)
            ),
            &[],
        )?;
        Ok(())
    }

    fn rename_table(&self, from: &str, to: &str) -> Result<()> {
        self.execute(
            &format!(
                "ALTER TABLE {} RENAME TO {}",
                quote_ident(from),
                quote_ident(to)
            ),
            &[],
        )?;
        Ok(())
    }
}
