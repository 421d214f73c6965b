//! The per-category "label changes since last train" counter.

use rusqlite::{params, Connection};

use sift_core::errors::SiftResult;

use super::category_ops::require_category;
use crate::to_storage_err;

pub fn get_counter(conn: &Connection, workspace_id: &str, category: &str) -> SiftResult<u64> {
    Ok(require_category(conn, workspace_id, category)?.label_changes_since_train)
}

/// Add `by` to the counter and return the new value.
pub fn increase_counter(
    conn: &Connection,
    workspace_id: &str,
    category: &str,
    by: u64,
) -> SiftResult<u64> {
    let current = get_counter(conn, workspace_id, category)?;
    let next = current.saturating_add(by);
    conn.execute(
        "UPDATE categories SET label_changes_since_train = ?3
         WHERE workspace_id = ?1 AND name = ?2",
        params![workspace_id, category, i64::try_from(next).unwrap_or(i64::MAX)],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(next)
}

pub fn reset_counter(conn: &Connection, workspace_id: &str, category: &str) -> SiftResult<()> {
    require_category(conn, workspace_id, category)?;
    conn.execute(
        "UPDATE categories SET label_changes_since_train = 0
         WHERE workspace_id = ?1 AND name = ?2",
        params![workspace_id, category],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
