//! Inference with a category's models and sampling by prediction.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::{latest_ready_model, ModelInfo, ModelStatus, Prediction, TextElement};

use crate::engine::{Orchestrator, Shared};

/// Which elements [`Orchestrator::sample_elements_by_prediction`] draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionFilter {
    /// Only elements without a label for the category.
    pub unlabeled_only: bool,
    /// Keep elements predicted with this label.
    pub required_label: bool,
    /// Seed of the shuffle; the same seed gives the same sample.
    pub seed: u64,
}

impl Default for PredictionFilter {
    fn default() -> Self {
        Self {
            unlabeled_only: false,
            required_label: true,
            seed: 0,
        }
    }
}

impl Orchestrator {
    /// Predictions for `elements`, one per element, using the model of
    /// `iteration` or, when `None`, the most recent iteration whose model is
    /// READY. Blocks the caller. Empty input returns no predictions without
    /// touching the store.
    pub fn infer(
        &self,
        workspace_id: &str,
        category: &str,
        elements: &[TextElement],
        iteration: Option<usize>,
    ) -> SiftResult<Vec<Prediction>> {
        infer(&self.inner, workspace_id, category, elements, iteration)
    }

    /// Up to `sample_size` elements whose latest-model prediction is
    /// `filter.required_label`, in a shuffled order fixed by `filter.seed`.
    pub fn sample_elements_by_prediction(
        &self,
        workspace_id: &str,
        category: &str,
        sample_size: usize,
        filter: PredictionFilter,
    ) -> SiftResult<Vec<TextElement>> {
        let dataset_name = self.inner.dataset_name(workspace_id)?;
        let labels = &self.inner.labels;
        let elements = if filter.unlabeled_only {
            labels.unlabeled_elements(workspace_id, &dataset_name, category)?
        } else {
            labels.all_elements(workspace_id, &dataset_name)?
        };
        let predictions = self.infer(workspace_id, category, &elements, None)?;

        let mut matching: Vec<TextElement> = elements
            .into_iter()
            .zip(predictions)
            .filter(|(_, prediction)| prediction.label() == filter.required_label)
            .map(|(element, _)| element)
            .collect();
        let mut rng = StdRng::seed_from_u64(filter.seed);
        matching.shuffle(&mut rng);
        matching.truncate(sample_size);
        Ok(matching)
    }
}

/// The iteration index and model `infer` would use.
pub(crate) fn resolve_model(
    shared: &Shared,
    workspace_id: &str,
    category: &str,
    iteration: Option<usize>,
) -> SiftResult<(usize, ModelInfo)> {
    let iterations = shared.store.get_iterations(workspace_id, category)?;
    let chosen = match iteration {
        Some(index) => iterations.get(index).ok_or_else(|| SiftError::IterationNotFound {
            workspace_id: workspace_id.to_string(),
            category: category.to_string(),
            iteration: index,
        })?,
        None => latest_ready_model(&iterations).ok_or_else(|| SiftError::NoReadyModel {
            workspace_id: workspace_id.to_string(),
            category: category.to_string(),
        })?,
    };
    if chosen.model.model_status != ModelStatus::Ready {
        return Err(SiftError::ModelNotReady {
            workspace_id: workspace_id.to_string(),
            category: category.to_string(),
            iteration: chosen.index,
            status: chosen.model.model_status,
        });
    }
    Ok((chosen.index, chosen.model.clone()))
}

pub(crate) fn infer(
    shared: &Shared,
    workspace_id: &str,
    category: &str,
    elements: &[TextElement],
    iteration: Option<usize>,
) -> SiftResult<Vec<Prediction>> {
    if elements.is_empty() {
        return Ok(Vec::new());
    }
    let (index, model) = resolve_model(shared, workspace_id, category, iteration)?;
    let provider = shared.models.get(&model.model_type)?;
    let predictions = provider.infer(&model.model_id, elements, true)?;
    tracing::debug!(
        workspace = workspace_id,
        category,
        iteration = index,
        model_id = %model.model_id,
        elements = elements.len(),
        "inference done"
    );
    Ok(predictions)
}
