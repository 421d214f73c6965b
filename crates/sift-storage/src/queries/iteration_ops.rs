//! Iteration rows, including the model columns.

use std::collections::BTreeMap;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::{
    Iteration, IterationStatus, ModelInfo, ModelMetadata, ModelStatus, ModelType,
};

use super::category_ops::require_category;
use super::parse_timestamp;
use crate::{corrupt, to_storage_err};

const TABLE: &str = "iterations";

const SELECT_COLUMNS: &str = "iteration_index, status, model_id, model_status, model_type,
     model_metadata, model_created_at, statistics, recommendations, created_at";

/// Raw column values; decoded outside the rusqlite row callback so decode
/// failures surface as `CorruptRecord`.
struct IterationRow {
    index: i64,
    status: String,
    model_id: String,
    model_status: String,
    model_type: String,
    model_metadata: String,
    model_created_at: String,
    statistics: String,
    recommendations: String,
    created_at: String,
}

impl IterationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            index: row.get(0)?,
            status: row.get(1)?,
            model_id: row.get(2)?,
            model_status: row.get(3)?,
            model_type: row.get(4)?,
            model_metadata: row.get(5)?,
            model_created_at: row.get(6)?,
            statistics: row.get(7)?,
            recommendations: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn decode(self) -> SiftResult<Iteration> {
        let status: IterationStatus = self.status.parse().map_err(|e: String| corrupt(TABLE, e))?;
        let model_status: ModelStatus =
            self.model_status.parse().map_err(|e: String| corrupt(TABLE, e))?;
        let metadata: ModelMetadata = serde_json::from_str(&self.model_metadata)
            .map_err(|e| corrupt(TABLE, format!("model_metadata: {e}")))?;
        let statistics: BTreeMap<String, f64> = serde_json::from_str(&self.statistics)
            .map_err(|e| corrupt(TABLE, format!("statistics: {e}")))?;
        let recommendations: Vec<String> = serde_json::from_str(&self.recommendations)
            .map_err(|e| corrupt(TABLE, format!("recommendations: {e}")))?;

        Ok(Iteration {
            index: usize::try_from(self.index)
                .map_err(|_| corrupt(TABLE, format!("negative index {}", self.index)))?,
            model: ModelInfo {
                model_id: self.model_id,
                model_status,
                model_type: ModelType::new(self.model_type),
                metadata,
                created_at: parse_timestamp(TABLE, &self.model_created_at)?,
            },
            status,
            statistics,
            recommendations,
            created_at: parse_timestamp(TABLE, &self.created_at)?,
        })
    }
}

/// Append an iteration in TRAINING status at index `max + 1` (or 0).
pub fn insert_iteration(
    conn: &Connection,
    workspace_id: &str,
    category: &str,
    model: &ModelInfo,
) -> SiftResult<usize> {
    require_category(conn, workspace_id, category)?;
    let next: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(iteration_index) + 1, 0) FROM iterations
             WHERE workspace_id = ?1 AND category = ?2",
            params![workspace_id, category],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let metadata = serde_json::to_string(&model.metadata)?;
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO iterations (
            workspace_id, category, iteration_index, status, model_id, model_status,
            model_type, model_metadata, model_created_at, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            workspace_id,
            category,
            next,
            IterationStatus::Training.as_str(),
            model.model_id,
            model.model_status.as_str(),
            model.model_type.as_str(),
            metadata,
            model.created_at.to_rfc3339(),
            now,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(next as usize)
}

pub fn list_iterations(conn: &Connection, workspace_id: &str, category: &str) -> SiftResult<Vec<Iteration>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM iterations
         WHERE workspace_id = ?1 AND category = ?2 ORDER BY iteration_index"
    );
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![workspace_id, category], IterationRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.into_iter().map(IterationRow::decode).collect()
}

pub fn get_iteration(
    conn: &Connection,
    workspace_id: &str,
    category: &str,
    index: usize,
) -> SiftResult<Option<Iteration>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM iterations
         WHERE workspace_id = ?1 AND category = ?2 AND iteration_index = ?3"
    );
    let row = conn
        .query_row(&sql, params![workspace_id, category, index as i64], IterationRow::from_row)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    row.map(IterationRow::decode).transpose()
}

/// Like [`get_iteration`] but a missing iteration is an `IterationNotFound`
/// error (or `CategoryNotFound` / `WorkspaceNotFound` when those are missing).
pub fn require_iteration(
    conn: &Connection,
    workspace_id: &str,
    category: &str,
    index: usize,
) -> SiftResult<Iteration> {
    match get_iteration(conn, workspace_id, category, index)? {
        Some(iteration) => Ok(iteration),
        None => {
            require_category(conn, workspace_id, category)?;
            Err(SiftError::IterationNotFound {
                workspace_id: workspace_id.to_string(),
                category: category.to_string(),
                iteration: index,
            })
        }
    }
}

pub fn update_status(
    conn: &Connection,
    workspace_id: &str,
    category: &str,
    index: usize,
    status: IterationStatus,
) -> SiftResult<()> {
    conn.execute(
        "UPDATE iterations SET status = ?4, updated_at = ?5
         WHERE workspace_id = ?1 AND category = ?2 AND iteration_index = ?3",
        params![workspace_id, category, index as i64, status.as_str(), Utc::now().to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_model_status(
    conn: &Connection,
    workspace_id: &str,
    category: &str,
    index: usize,
    status: ModelStatus,
) -> SiftResult<()> {
    conn.execute(
        "UPDATE iterations SET model_status = ?4, updated_at = ?5
         WHERE workspace_id = ?1 AND category = ?2 AND iteration_index = ?3",
        params![workspace_id, category, index as i64, status.as_str(), Utc::now().to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_statistics(
    conn: &Connection,
    workspace_id: &str,
    category: &str,
    index: usize,
    statistics: &BTreeMap<String, f64>,
) -> SiftResult<()> {
    let json = serde_json::to_string(statistics)?;
    conn.execute(
        "UPDATE iterations SET statistics = ?4, updated_at = ?5
         WHERE workspace_id = ?1 AND category = ?2 AND iteration_index = ?3",
        params![workspace_id, category, index as i64, json, Utc::now().to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_recommendations(
    conn: &Connection,
    workspace_id: &str,
    category: &str,
    index: usize,
    element_ids: &[String],
) -> SiftResult<()> {
    let json = serde_json::to_string(element_ids)?;
    conn.execute(
        "UPDATE iterations SET recommendations = ?4, updated_at = ?5
         WHERE workspace_id = ?1 AND category = ?2 AND iteration_index = ?3",
        params![workspace_id, category, index as i64, json, Utc::now().to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
