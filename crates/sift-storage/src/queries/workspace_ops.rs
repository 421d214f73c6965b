//! Workspace rows.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use sift_core::errors::{SiftError, SiftResult};

use super::parse_timestamp;
use crate::to_storage_err;

pub fn insert_workspace(conn: &Connection, workspace_id: &str, dataset_name: &str) -> SiftResult<()> {
    if workspace_exists(conn, workspace_id)? {
        return Err(SiftError::WorkspaceExists {
            workspace_id: workspace_id.to_string(),
        });
    }
    conn.execute(
        "INSERT INTO workspaces (workspace_id, dataset_name, created_at) VALUES (?1, ?2, ?3)",
        params![workspace_id, dataset_name, Utc::now().to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn workspace_exists(conn: &Connection, workspace_id: &str) -> SiftResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM workspaces WHERE workspace_id = ?1)",
        params![workspace_id],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Fails with `WorkspaceNotFound` when the workspace does not exist.
pub fn require_workspace(conn: &Connection, workspace_id: &str) -> SiftResult<()> {
    if workspace_exists(conn, workspace_id)? {
        Ok(())
    } else {
        Err(SiftError::WorkspaceNotFound {
            workspace_id: workspace_id.to_string(),
        })
    }
}

/// `(dataset_name, created_at)` of a workspace.
pub fn get_workspace_row(
    conn: &Connection,
    workspace_id: &str,
) -> SiftResult<Option<(String, DateTime<Utc>)>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT dataset_name, created_at FROM workspaces WHERE workspace_id = ?1",
            params![workspace_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match row {
        Some((dataset, created)) => Ok(Some((dataset, parse_timestamp("workspaces", &created)?))),
        None => Ok(None),
    }
}

pub fn list_workspace_ids(conn: &Connection) -> SiftResult<Vec<String>> {
    let mut stmt = conn
        .prepare_cached("SELECT workspace_id FROM workspaces ORDER BY workspace_id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<String>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn workspace_ids_for_dataset(conn: &Connection, dataset_name: &str) -> SiftResult<Vec<String>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT workspace_id FROM workspaces WHERE dataset_name = ?1 ORDER BY workspace_id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![dataset_name], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<String>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Categories and iterations go with it through `ON DELETE CASCADE`.
pub fn delete_workspace(conn: &Connection, workspace_id: &str) -> SiftResult<()> {
    let deleted = conn
        .execute(
            "DELETE FROM workspaces WHERE workspace_id = ?1",
            params![workspace_id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if deleted == 0 {
        return Err(SiftError::WorkspaceNotFound {
            workspace_id: workspace_id.to_string(),
        });
    }
    Ok(())
}
