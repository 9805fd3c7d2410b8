//! Declarative preconditions
//!
//! A guard names a piece of schema state that means "this unit's work is
//! already done". The runner checks a unit's guards inside the unit's
//! transaction before calling `apply`; the first one that trips turns the
//! unit into a recorded no-op. Re-running a half-applied unit after a crash
//! then succeeds instead of failing on "duplicate column".

use crate::errors::Result;
use crate::executor::SchemaExecutor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    SkipIfTableExists {
        table: String,
    },
    SkipIfTableMissing {
        table: String,
    },
    SkipIfColumnExists {
        table: String,
        column: String,
    },
    SkipIfColumnMissing {
        table: String,
        column: String,
    },
    SkipIfIndexExists {
        index: String,
    },
    SkipIfIndexMissing {
        index: String,
    },
    SkipIfForeignKeyExists {
        table: String,
        column: String,
        ref_table: String,
    },
}

impl Guard {
    pub fn column_exists(table: impl Into<String>, column: impl Into<String>) -> Self {
        Guard::SkipIfColumnExists {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn column_missing(table: impl Into<String>, column: impl Into<String>) -> Self {
        Guard::SkipIfColumnMissing {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn table_exists(table: impl Into<String>) -> Self {
        Guard::SkipIfTableExists {
            table: table.into(),
        }
    }

    pub fn table_missing(table: impl Into<String>) -> Self {
        Guard::SkipIfTableMissing {
            table: table.into(),
        }
    }

    pub fn index_exists(index: impl Into<String>) -> Self {
        Guard::SkipIfIndexExists {
            index: index.into(),
        }
    }

    pub fn index_missing(index: impl Into<String>) -> Self {
        Guard::SkipIfIndexMissing {
            index: index.into(),
        }
    }

    pub fn foreign_key_exists(
        table: impl Into<String>,
        column: impl Into<String>,
        ref_table: impl Into<String>,
    ) -> Self {
        Guard::SkipIfForeignKeyExists {
            table: table.into(),
            column: column.into(),
            ref_table: ref_table.into(),
        }
    }

    /// True if the schema is already in the state this guard describes
    pub fn is_tripped(&self, schema: &dyn SchemaExecutor) -> Result<bool> {
        match self {
            Guard::SkipIfTableExists { table } => schema.table_exists(table),
            Guard::SkipIfTableMissing { table } => Ok(!schema.table_exists(table)?),
            Guard::SkipIfColumnExists { table, column } => schema.column_exists(table, column),
            Guard::SkipIfColumnMissing { table, column } => {
                Ok(!schema.column_exists(table, column)?)
            }
            Guard::SkipIfIndexExists { index } => schema.index_exists(index),
            Guard::SkipIfIndexMissing { index } => Ok(!schema.index_exists(index)?),
            Guard::SkipIfForeignKeyExists {
                table,
                column,
                ref_table,
            } => schema.foreign_key_exists(table, column, ref_table),
        }
    }
}

impl std::fmt::Display for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Guard::SkipIfTableExists { table } => write!(f, "table {} exists", table),
            Guard::SkipIfTableMissing { table } => write!(f, "table {} missing", table),
            Guard::SkipIfColumnExists { table, column } => {
                write!(f, "column {}.{} exists", table, column)
            }
            Guard::SkipIfColumnMissing { table, column } => {
                write!(f, "column {}.{} missing", table, column)
            }
            Guard::SkipIfIndexExists { index } => write!(f, "index {} exists", index),
            Guard::SkipIfIndexMissing { index } => write!(f, "index {} missing", index),
            Guard::SkipIfForeignKeyExists {
                table,
                column,
                ref_table,
            } => write!(f, "foreign key {}.{} -> {} exists", table, column, ref_table),
        }
    }
}

/// First guard in `guards` that trips, if any
pub fn first_tripped<'g>(
    guards: &'g [Guard],
    schema: &dyn SchemaExecutor,
) -> Result<Option<&'g Guard>> {
    for guard in guards {
        if guard.is_tripped(schema)? {
            return Ok(Some(guard));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_reads_as_skip_reason() {
        assert_eq!(
            Guard::column_exists("orders", "discount").to_string(),
            "column orders.discount exists"
        );
        assert_eq!(
            Guard::foreign_key_exists("line_items", "order_id", "orders").to_string(),
            "foreign key line_items.order_id -> orders exists"
        );
        assert_eq!(Guard::index_missing("idx_sku").to_string(), "index idx_sku missing");
    }
}
