//! Category rows.

use rusqlite::{params, Connection, OptionalExtension};

use sift_core::errors::{SiftError, SiftResult};

use super::workspace_ops::require_workspace;
use crate::to_storage_err;

/// A category row without its iterations.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub name: String,
    pub description: String,
    pub label_changes_since_train: u64,
}

pub fn insert_category(
    conn: &Connection,
    workspace_id: &str,
    name: &str,
    description: &str,
) -> SiftResult<()> {
    require_workspace(conn, workspace_id)?;
    if get_category_row(conn, workspace_id, name)?.is_some() {
        return Err(SiftError::CategoryExists {
            workspace_id: workspace_id.to_string(),
            category: name.to_string(),
        });
    }
    conn.execute(
        "INSERT INTO categories (workspace_id, name, description) VALUES (?1, ?2, ?3)",
        params![workspace_id, name, description],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_category_row(
    conn: &Connection,
    workspace_id: &str,
    name: &str,
) -> SiftResult<Option<CategoryRow>> {
    conn.query_row(
        "SELECT name, description, label_changes_since_train
         FROM categories WHERE workspace_id = ?1 AND name = ?2",
        params![workspace_id, name],
        |row| {
            Ok(CategoryRow {
                name: row.get(0)?,
                description: row.get(1)?,
                label_changes_since_train: row.get::<_, i64>(2)?.max(0) as u64,
            })
        },
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Fails with `WorkspaceNotFound` or `CategoryNotFound`.
pub fn require_category(conn: &Connection, workspace_id: &str, name: &str) -> SiftResult<CategoryRow> {
    match get_category_row(conn, workspace_id, name)? {
        Some(row) => Ok(row),
        None => {
            require_workspace(conn, workspace_id)?;
            Err(SiftError::CategoryNotFound {
                workspace_id: workspace_id.to_string(),
                category: name.to_string(),
            })
        }
    }
}

pub fn list_category_rows(conn: &Connection, workspace_id: &str) -> SiftResult<Vec<CategoryRow>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT name, description, label_changes_since_train
             FROM categories WHERE workspace_id = ?1 ORDER BY name",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![workspace_id], |row| {
            Ok(CategoryRow {
                name: row.get(0)?,
                description: row.get(1)?,
                label_changes_since_train: row.get::<_, i64>(2)?.max(0) as u64,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Iterations go with it through `ON DELETE CASCADE`.
pub fn delete_category(conn: &Connection, workspace_id: &str, name: &str) -> SiftResult<()> {
    require_category(conn, workspace_id, name)?;
    conn.execute(
        "DELETE FROM categories WHERE workspace_id = ?1 AND name = ?2",
        params![workspace_id, name],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
