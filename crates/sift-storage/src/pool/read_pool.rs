//! Read-only connections handed out in turn.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use sift_core::config::StorageConfig;
use sift_core::errors::SiftResult;

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

const MAX_READERS: usize = 8;

/// Readers for iteration and category lookups. Writes never go through here.
pub struct ReadPool {
    readers: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl ReadPool {
    /// `config.read_pool_size` readers on `path`, capped at eight.
    pub fn open(path: &Path, config: &StorageConfig) -> SiftResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let readers = (0..Self::reader_count(config.read_pool_size))
            .map(|_| {
                let conn = Connection::open_with_flags(path, flags)
                    .map_err(|e| to_storage_err(format!("open reader: {e}")))?;
                apply_read_pragmas(&conn, config.busy_timeout_ms)?;
                Ok(Mutex::new(conn))
            })
            .collect::<SiftResult<Vec<_>>>()?;
        Ok(Self::from_readers(readers))
    }

    /// A single detached in-memory reader. It sees none of the writer's
    /// data; in-memory stores read through the writer instead.
    pub fn detached() -> SiftResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| to_storage_err(format!("open reader: {e}")))?;
        Ok(Self::from_readers(vec![Mutex::new(conn)]))
    }

    fn from_readers(readers: Vec<Mutex<Connection>>) -> Self {
        Self {
            readers,
            cursor: AtomicUsize::new(0),
        }
    }

    fn reader_count(requested: usize) -> usize {
        requested.clamp(1, MAX_READERS)
    }

    pub fn with_conn<F, T>(&self, f: F) -> SiftResult<T>
    where
        F: FnOnce(&Connection) -> SiftResult<T>,
    {
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[slot]
            .lock()
            .map_err(|e| to_storage_err(format!("reader {slot} poisoned: {e}")))?;
        f(&conn)
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_count_is_clamped() {
        assert_eq!(ReadPool::reader_count(0), 1);
        assert_eq!(ReadPool::reader_count(3), 3);
        assert_eq!(ReadPool::reader_count(64), MAX_READERS);
    }

    #[test]
    fn detached_pool_has_one_reader() {
        let pool = ReadPool::detached().unwrap();
        assert_eq!(pool.len(), 1);
        let one: i64 = pool
            .with_conn(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get(0))
                    .map_err(|e| to_storage_err(e.to_string()))
            })
            .unwrap();
        assert_eq!(one, 1);
    }
}
