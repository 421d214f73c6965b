//! PRAGMA configuration applied to every SQLite connection.

use rusqlite::Connection;

use sift_core::config::StorageConfig;
use sift_core::errors::SiftResult;

use crate::to_storage_err;

/// Apply write-side pragmas: WAL (when enabled), NORMAL sync, busy timeout,
/// foreign keys ON.
pub fn apply_pragmas(conn: &Connection, config: &StorageConfig) -> SiftResult<()> {
    let journal = if config.wal_enabled { "WAL" } else { "DELETE" };
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = {journal};
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = {};
        PRAGMA foreign_keys = ON;
        ",
        config.busy_timeout_ms
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Pragmas for read-only connections.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u64) -> SiftResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA busy_timeout = {busy_timeout_ms};
        PRAGMA query_only = ON;
        "
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> SiftResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
