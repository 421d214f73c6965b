use std::collections::BTreeMap;

use tokio::sync::broadcast;

use crate::errors::SiftResult;
use crate::models::{
    Category, Iteration, IterationStatus, ModelInfo, ModelStatus, StatusChange, TrainingClaim,
    Workspace,
};

/// Durable workspace/category/iteration state plus the per-category label
/// change counter.
///
/// Every read-then-write sequence on one category is atomic: appending an
/// iteration, status updates, counter updates, and [`claim_training`].
///
/// [`claim_training`]: IStateStore::claim_training
pub trait IStateStore: Send + Sync {
    // --- Workspaces ---
    fn create_workspace(&self, workspace_id: &str, dataset_name: &str) -> SiftResult<()>;
    /// The workspace with all of its categories and iterations.
    fn get_workspace(&self, workspace_id: &str) -> SiftResult<Workspace>;
    fn workspace_exists(&self, workspace_id: &str) -> SiftResult<bool>;
    /// Workspace ids, sorted.
    fn list_workspace_ids(&self) -> SiftResult<Vec<String>>;
    /// Ids of the workspaces built on `dataset_name`, sorted.
    fn workspaces_for_dataset(&self, dataset_name: &str) -> SiftResult<Vec<String>>;
    /// Removes the workspace and cascades to its categories and iterations.
    fn delete_workspace(&self, workspace_id: &str) -> SiftResult<()>;

    // --- Categories ---
    fn add_category(&self, workspace_id: &str, name: &str, description: &str) -> SiftResult<()>;
    fn get_category(&self, workspace_id: &str, name: &str) -> SiftResult<Category>;
    fn delete_category(&self, workspace_id: &str, name: &str) -> SiftResult<()>;

    // --- Iterations ---
    /// Append a TRAINING iteration carrying `model`; returns its index.
    fn append_iteration(
        &self,
        workspace_id: &str,
        category: &str,
        model: &ModelInfo,
    ) -> SiftResult<usize>;
    fn get_iterations(&self, workspace_id: &str, category: &str) -> SiftResult<Vec<Iteration>>;
    fn get_iteration(
        &self,
        workspace_id: &str,
        category: &str,
        index: usize,
    ) -> SiftResult<Iteration>;
    fn iterations_by_status(
        &self,
        workspace_id: &str,
        category: &str,
        status: IterationStatus,
    ) -> SiftResult<Vec<Iteration>>;
    /// Fails with `InvalidTransition` for an edge outside the lifecycle, and
    /// with `ModelNotReady` when moving to READY while the model is not READY.
    fn set_iteration_status(
        &self,
        workspace_id: &str,
        category: &str,
        index: usize,
        status: IterationStatus,
    ) -> SiftResult<()>;
    fn set_model_status(
        &self,
        workspace_id: &str,
        category: &str,
        index: usize,
        status: ModelStatus,
    ) -> SiftResult<()>;
    /// Mark the iteration's model DELETED and return it as it was before.
    /// Fails with `ModelAlreadyDeleted` when it is already DELETED.
    fn mark_model_deleted(
        &self,
        workspace_id: &str,
        category: &str,
        index: usize,
    ) -> SiftResult<ModelInfo>;
    /// Merge `statistics` into the iteration's statistics.
    fn add_iteration_statistics(
        &self,
        workspace_id: &str,
        category: &str,
        index: usize,
        statistics: &BTreeMap<String, f64>,
    ) -> SiftResult<()>;
    fn set_recommendations(
        &self,
        workspace_id: &str,
        category: &str,
        index: usize,
        element_ids: &[String],
    ) -> SiftResult<()>;
    /// Recommendations of the latest READY iteration; empty when none is READY.
    fn current_recommendations(&self, workspace_id: &str, category: &str)
        -> SiftResult<Vec<String>>;

    // --- Label change counter ---
    fn label_change_count(&self, workspace_id: &str, category: &str) -> SiftResult<u64>;
    /// Returns the new value.
    fn increase_label_change_count(
        &self,
        workspace_id: &str,
        category: &str,
        by: u64,
    ) -> SiftResult<u64>;
    fn reset_label_change_count(&self, workspace_id: &str, category: &str) -> SiftResult<()>;
    /// Atomically: refuse when the latest non-ERROR iteration is not READY,
    /// refuse when `min_changes` is set and the counter is below it,
    /// otherwise reset the counter to 0.
    fn claim_training(
        &self,
        workspace_id: &str,
        category: &str,
        min_changes: Option<u64>,
    ) -> SiftResult<TrainingClaim>;

    // --- Notifications ---
    /// Status-change feed. Stores without one return `None` and callers
    /// fall back to polling.
    fn subscribe(&self) -> Option<broadcast::Receiver<StatusChange>> {
        None
    }
}
