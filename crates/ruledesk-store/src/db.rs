//! Database connection management

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, io_error, Result};
use crate::migrations::apply_migrations;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Default time a writer waits on a locked database
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Foreign keys, WAL and the busy timeout used by concurrent writers
pub fn configure(conn: &Connection, busy_timeout: Duration) -> Result<()> {
    // first, so the pragmas below wait on other writers too
    conn.busy_timeout(busy_timeout).map_err(from_rusqlite)?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(from_rusqlite)?;
    Ok(())
}

/// Open, configure and migrate the database at `path`, creating its parent
/// directory if needed
pub fn open_store<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error("create_db_dir", e))?;
    }
    let mut conn = open(path)?;
    configure(&conn, busy_timeout)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}
