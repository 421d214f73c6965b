use crate::models::{IterationStatus, ModelStatus};

use super::{ConfigError, ModelError, StorageError};

/// Top-level error for every synchronous sift operation.
///
/// Validation variants carry the workspace, category, and iteration they
/// refer to so a failed call can be diagnosed from the message alone.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    #[error("workspace '{workspace_id}' not found")]
    WorkspaceNotFound { workspace_id: String },

    #[error("workspace '{workspace_id}' already exists")]
    WorkspaceExists { workspace_id: String },

    #[error("dataset '{dataset_name}' does not exist")]
    DatasetNotFound { dataset_name: String },

    #[error("category '{category}' not found in workspace '{workspace_id}'")]
    CategoryNotFound {
        workspace_id: String,
        category: String,
    },

    #[error("category '{category}' already exists in workspace '{workspace_id}'")]
    CategoryExists {
        workspace_id: String,
        category: String,
    },

    #[error("iteration {iteration} not found in workspace '{workspace_id}' category '{category}'")]
    IterationNotFound {
        workspace_id: String,
        category: String,
        iteration: usize,
    },

    #[error(
        "model for iteration {iteration} in workspace '{workspace_id}' category '{category}' \
         is not ready (current status is {status})"
    )]
    ModelNotReady {
        workspace_id: String,
        category: String,
        iteration: usize,
        status: ModelStatus,
    },

    #[error("no ready model in workspace '{workspace_id}' category '{category}'")]
    NoReadyModel {
        workspace_id: String,
        category: String,
    },

    #[error(
        "model {model_id} of iteration {iteration} in workspace '{workspace_id}' \
         category '{category}' is already deleted"
    )]
    ModelAlreadyDeleted {
        workspace_id: String,
        category: String,
        iteration: usize,
        model_id: String,
    },

    #[error(
        "iteration {iteration} in workspace '{workspace_id}' category '{category}' \
         cannot move from {from} to {to}"
    )]
    InvalidTransition {
        workspace_id: String,
        category: String,
        iteration: usize,
        from: IterationStatus,
        to: IterationStatus,
    },

    #[error("model {model_id} cannot move from {from} to {to}")]
    InvalidModelTransition {
        model_id: String,
        from: ModelStatus,
        to: ModelStatus,
    },

    #[error(
        "start index {start} exceeds the {available} recommendations of \
         workspace '{workspace_id}' category '{category}'"
    )]
    RecommendationsOutOfRange {
        workspace_id: String,
        category: String,
        start: usize,
        available: usize,
    },

    #[error(
        "timed out after {waited_ms} ms waiting for iteration {iteration} in \
         workspace '{workspace_id}' category '{category}'"
    )]
    WaitTimedOut {
        workspace_id: String,
        category: String,
        iteration: usize,
        waited_ms: u64,
    },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("background job failed: {reason}")]
    JobFailed { reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used across the workspace.
pub type SiftResult<T> = Result<T, SiftError>;
