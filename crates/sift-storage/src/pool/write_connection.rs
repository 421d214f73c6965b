//! The single serialized write connection.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use sift_core::config::StorageConfig;
use sift_core::errors::SiftResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// Owns the only connection allowed to write. Holding its lock for the whole
/// of a read-then-write sequence is what makes those sequences atomic.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, config: &StorageConfig) -> SiftResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory(config: &StorageConfig) -> SiftResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` with exclusive access to the writer.
    pub fn with_conn_sync<F, T>(&self, f: F) -> SiftResult<T>
    where
        F: FnOnce(&Connection) -> SiftResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write lock poisoned: {e}")))?;
        f(&guard)
    }

    /// Run `f` inside a BEGIN IMMEDIATE transaction. Commits on `Ok`, rolls
    /// back on `Err`.
    pub fn with_immediate_transaction<F, T>(&self, f: F) -> SiftResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> SiftResult<T>,
    {
        self.with_conn_sync(|conn| {
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
                .map_err(|e| to_storage_err(format!("begin immediate: {e}")))?;
            match f(&tx) {
                Ok(value) => {
                    tx.commit()
                        .map_err(|e| to_storage_err(format!("commit: {e}")))?;
                    Ok(value)
                }
                Err(e) => {
                    let _ = tx.rollback();
                    Err(e)
                }
            }
        })
    }
}
