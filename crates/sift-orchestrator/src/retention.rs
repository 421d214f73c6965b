//! Model deletion and the retention sweep that bounds stored artifacts.

use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::{Iteration, IterationStatus, ModelStatus};
use sift_observability::tracing_setup::events;

use crate::engine::{Orchestrator, Shared};

impl Orchestrator {
    /// Mark the model of `iteration` DELETED and remove its artifact.
    /// Fails when the model is already deleted.
    pub fn delete_model(&self, workspace_id: &str, category: &str, iteration: usize) -> SiftResult<()> {
        delete_model(&self.inner, workspace_id, category, iteration)
    }
}

pub(crate) fn delete_model(shared: &Shared, workspace_id: &str, category: &str, iteration: usize) -> SiftResult<()> {
    let model = shared.store.mark_model_deleted(workspace_id, category, iteration)?;
    shared.metrics.record_model_deleted();
    events::model_deleted(workspace_id, category, iteration, &model.model_id);

    // The store already says DELETED; an artifact left behind here is orphaned.
    let removed = shared
        .models
        .get(&model.model_type)
        .map_err(SiftError::from)
        .and_then(|provider| provider.delete(&model.model_id).map_err(SiftError::from));
    if let Err(err) = &removed {
        tracing::error!(
            workspace = workspace_id,
            category,
            iteration,
            model_id = %model.model_id,
            error = %err,
            "model artifact orphaned: marked deleted but the provider could not remove it"
        );
    }
    removed
}

/// Indices whose artifacts must go once `finished` is done: every READY
/// iteration up to and including it except the `keep` most recent,
/// skipping models that are already deleted. A failed `finished` does not
/// use up a slot.
pub(crate) fn sweep_candidates(
    iterations: &[Iteration],
    finished: usize,
    keep: usize,
) -> Vec<usize> {
    let ready: Vec<&Iteration> = iterations
        .iter()
        .filter(|it| it.index <= finished && it.status == IterationStatus::Ready)
        .collect();
    let excess = ready.len().saturating_sub(keep);
    ready[..excess]
        .iter()
        .filter(|it| it.model.model_status != ModelStatus::Deleted)
        .map(|it| it.index)
        .collect()
}

/// Delete the artifacts [`sweep_candidates`] names. Returns the indices
/// deleted by this sweep.
pub(crate) fn sweep_old_models(
    shared: &Shared,
    workspace_id: &str,
    category: &str,
    finished: usize,
) -> SiftResult<Vec<usize>> {
    let iterations = shared.store.get_iterations(workspace_id, category)?;
    let keep = shared.config.retention.models_to_keep;
    let mut deleted = Vec::new();
    for index in sweep_candidates(&iterations, finished, keep) {
        tracing::info!(
            workspace = workspace_id,
            category,
            iteration = index,
            keep,
            "deleting model beyond retention"
        );
        match delete_model(shared, workspace_id, category, index) {
            Ok(()) => deleted.push(index),
            // A concurrent sweep got there first.
            Err(SiftError::ModelAlreadyDeleted { .. }) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(deleted)
}
