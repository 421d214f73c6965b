//! # sift-storage
//!
//! SQLite-backed state store for workspaces, categories, iterations and
//! their models. One serialized writer plus a pool of WAL readers.

pub mod engine;
pub mod migrations;
pub mod notify;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;
pub use notify::StatusNotifier;

use sift_core::errors::{SiftError, StorageError};

/// Wrap a message as a storage error.
pub fn to_storage_err(message: String) -> SiftError {
    SiftError::Storage(StorageError::SqliteError { message })
}

/// A row that could not be decoded back into a model type.
pub(crate) fn corrupt(table: &str, details: impl Into<String>) -> SiftError {
    SiftError::Storage(StorageError::CorruptRecord {
        table: table.to_string(),
        details: details.into(),
    })
}
