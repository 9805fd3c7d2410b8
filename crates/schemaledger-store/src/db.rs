//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// How long a connection waits on a locked database before giving up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection for runner use
///
/// The busy timeout makes a second runner wait for the first one's unit
/// transaction instead of failing with `SQLITE_BUSY`.
pub fn configure(conn: &Connection, busy_timeout: Duration) -> Result<()> {
    // First, so the journal mode switch below also waits on a busy file.
    conn.busy_timeout(busy_timeout).map_err(from_rusqlite)?;

    conn.execute_batch("PRAGMA foreign_keys = ON")
        .map_err(from_rusqlite)?;

    // journal_mode returns a row, so it cannot go through execute()
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .map_err(from_rusqlite)?;

    Ok(())
}

/// Open, configure and bootstrap a database file in one step
pub fn open_store<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Connection> {
    let mut conn = open(path)?;
    configure(&conn, busy_timeout)?;
    crate::bootstrap::bootstrap(&mut conn)?;
    Ok(conn)
}
