//! Retraining trigger: start a new iteration once enough labels changed.

use std::collections::BTreeMap;
use std::sync::Arc;

use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::TrainingClaim;
use sift_observability::tracing_setup::events;

use crate::engine::{Orchestrator, Shared};
use crate::iteration::start::start_iteration;
use crate::statistics;

impl Orchestrator {
    /// Start a new iteration when the category has at least the configured
    /// number of positive labels and label changes since the last model, or
    /// unconditionally with `force`. Never starts one while the latest
    /// non-failed iteration is still running.
    ///
    /// Returns the new model id, or `None` when nothing was started. Errors
    /// are logged, never returned.
    pub fn train_if_recommended(&self, workspace_id: &str, category: &str, force: bool) -> Option<String> {
        let span = sift_observability::trigger_span!(workspace_id, category, force);
        let _entered = span.enter();
        match train_if_recommended(&self.inner, workspace_id, category, force) {
            Ok(Some(model_id)) => {
                self.inner.metrics.record_trigger_fired();
                Some(model_id)
            }
            Ok(None) => {
                self.inner.metrics.record_trigger_suppressed();
                None
            }
            Err(err) => {
                tracing::error!(
                    workspace = workspace_id,
                    category,
                    error = %err,
                    "train_if_recommended failed, model will not be trained"
                );
                None
            }
        }
    }

    /// Percent of the way to the next automatic iteration: the smaller of
    /// change progress and positive-label progress. 0 without positives.
    pub fn progress(&self, workspace_id: &str, category: &str) -> SiftResult<u32> {
        let dataset_name = self.inner.dataset_name(workspace_id)?;
        let counts = self
            .inner
            .labels
            .label_counts(workspace_id, &dataset_name, category, false)?;
        let changes = self.inner.store.label_change_count(workspace_id, category)?;
        let training = &self.inner.config.training;
        Ok(statistics::progress(
            counts.positive,
            changes,
            training.first_model_positive_threshold,
            training.changed_element_threshold,
        ))
    }
}

fn train_if_recommended(
    shared: &Arc<Shared>,
    workspace_id: &str,
    category: &str,
    force: bool,
) -> SiftResult<Option<String>> {
    let lock = shared.trigger_lock(workspace_id, category);
    let _serialized = lock.lock().map_err(|_| SiftError::JobFailed {
        reason: format!("trigger lock of category '{category}' is poisoned"),
    })?;

    let dataset_name = shared.dataset_name(workspace_id)?;
    let training = &shared.config.training;
    let positives = shared
        .labels
        .label_counts(workspace_id, &dataset_name, category, true)?
        .positive;
    let changes = shared.store.label_change_count(workspace_id, category)?;

    if !force {
        if positives < training.first_model_positive_threshold {
            events::trigger_suppressed(
                workspace_id,
                category,
                &format!(
                    "{positives} positive elements (should be >= {})",
                    training.first_model_positive_threshold
                ),
            );
            return Ok(None);
        }
        if changes < training.changed_element_threshold {
            events::trigger_suppressed(
                workspace_id,
                category,
                &format!(
                    "{changes} elements changed since last model (should be >= {})",
                    training.changed_element_threshold
                ),
            );
            return Ok(None);
        }
    }

    let min_changes = (!force).then_some(training.changed_element_threshold);
    match shared.store.claim_training(workspace_id, category, min_changes)? {
        TrainingClaim::Claimed { changes } => {
            tracing::info!(
                workspace = workspace_id,
                category,
                positives,
                changes,
                force,
                "training a new model"
            );
        }
        TrainingClaim::InFlight { iteration, status } => {
            events::trigger_suppressed(
                workspace_id,
                category,
                &format!("iteration {iteration} is still {status}"),
            );
            return Ok(None);
        }
        TrainingClaim::BelowThreshold { changes } => {
            events::trigger_suppressed(
                workspace_id,
                category,
                &format!("{changes} elements changed since last model"),
            );
            return Ok(None);
        }
    }

    let record = shared.store.get_category(workspace_id, category)?;
    let model_type = shared.policy.for_iteration(record.non_error_count()).clone();
    let train_data = shared
        .selector
        .training_set(shared.labels.as_ref(), workspace_id, &dataset_name, category)?;
    let model_id = start_iteration(
        shared,
        workspace_id,
        category,
        &model_type,
        train_data,
        BTreeMap::new(),
    )?;
    Ok(Some(model_id))
}
