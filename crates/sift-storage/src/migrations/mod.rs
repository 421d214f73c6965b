//! Schema migrations tracked through `PRAGMA user_version`.

pub mod v001_initial_schema;

use rusqlite::Connection;

use sift_core::errors::{SiftResult, StorageError};

use crate::to_storage_err;

/// Ordered `(version, sql)` pairs. Versions are contiguous from 1.
const MIGRATIONS: &[(u32, &str)] = &[(1, v001_initial_schema::MIGRATION_SQL)];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 1;

/// Read the schema version stored in the database.
pub fn current_version(conn: &Connection) -> SiftResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Apply every migration newer than the stored version, each in its own
/// transaction. Returns how many were applied.
pub fn run_migrations(conn: &Connection) -> SiftResult<usize> {
    let current = current_version(conn)?;
    let mut applied = 0;

    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| to_storage_err(format!("migration {version} begin: {e}")))?;
        let result = tx
            .execute_batch(sql)
            .and_then(|_| tx.pragma_update(None, "user_version", version));
        match result {
            Ok(()) => {
                tx.commit()
                    .map_err(|e| to_storage_err(format!("migration {version} commit: {e}")))?;
            }
            Err(e) => {
                let _ = tx.rollback();
                return Err(StorageError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                }
                .into());
            }
        }
        tracing::info!(version, "applied schema migration");
        applied += 1;
    }

    Ok(applied)
}
