//! Submitting a new iteration.

use std::collections::BTreeMap;
use std::sync::Arc;

use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::{ModelInfo, ModelMetadata, ModelType, TrainParams, TrainingExample};
use sift_observability::tracing_setup::events;

use crate::engine::{Orchestrator, Shared};
use crate::iteration::coordinator::{IterationCoordinator, IterationKey};

impl Orchestrator {
    /// Start training a `model_type` model on `train_data` and return its
    /// model id without waiting. The new iteration is appended in TRAINING;
    /// inference, statistics and recommendations follow in the background.
    ///
    /// This does not check whether another iteration of the category is
    /// still running. [`train_if_recommended`](Self::train_if_recommended)
    /// does.
    pub fn start_iteration(
        &self,
        workspace_id: &str,
        category: &str,
        model_type: &ModelType,
        train_data: Vec<TrainingExample>,
        params: TrainParams,
    ) -> SiftResult<String> {
        start_iteration(&self.inner, workspace_id, category, model_type, train_data, params)
    }
}

/// Detailed label name → number of training examples carrying it.
pub(crate) fn train_counts(train_data: &[TrainingExample]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for example in train_data {
        *counts.entry(example.label.detailed_name().to_string()).or_insert(0) += 1;
    }
    counts
}

pub(crate) fn start_iteration(
    shared: &Arc<Shared>,
    workspace_id: &str,
    category: &str,
    model_type: &ModelType,
    train_data: Vec<TrainingExample>,
    params: TrainParams,
) -> SiftResult<String> {
    let dataset_name = shared.dataset_name(workspace_id)?;
    shared.store.get_category(workspace_id, category)?;
    let provider = shared.models.get(model_type)?;
    if train_data.is_empty() {
        return Err(SiftError::InvalidInput {
            reason: format!("no training examples for category '{category}' in workspace '{workspace_id}'"),
        });
    }

    let counts = train_counts(&train_data);
    tracing::info!(
        workspace = workspace_id,
        category,
        model_type = %model_type,
        examples = train_data.len(),
        counts = ?counts,
        "training new model"
    );

    let model_id = provider.create_model(&params)?;
    let model = ModelInfo::training(
        model_id.clone(),
        model_type.clone(),
        ModelMetadata {
            train_counts: counts,
            params: params.clone(),
        },
    );
    let index = shared.store.append_iteration(workspace_id, category, &model)?;

    shared.metrics.record_iteration_started();
    events::iteration_started(workspace_id, category, index, &model_id, model_type.as_str());

    let key = IterationKey {
        workspace_id: workspace_id.to_string(),
        category: category.to_string(),
        dataset_name,
        index,
        model_id: model_id.clone(),
    };
    let coordinator = IterationCoordinator::new(Arc::clone(shared), key, provider);
    shared
        .pool
        .runtime()
        .spawn(coordinator.run(train_data, params));

    Ok(model_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::models::{Label, LabelKind};

    fn example(label: Label) -> TrainingExample {
        TrainingExample {
            element_id: "e".to_string(),
            text: "t".to_string(),
            label,
        }
    }

    #[test]
    fn counts_use_detailed_label_names() {
        let weak_positive = Label {
            positive: true,
            kind: LabelKind::Weak,
        };
        let data = vec![
            example(Label::positive()),
            example(Label::positive()),
            example(Label::negative()),
            example(weak_positive),
        ];
        let counts = train_counts(&data);
        assert_eq!(counts.get("true"), Some(&2));
        assert_eq!(counts.get("false"), Some(&1));
        assert_eq!(counts.get("weak_true"), Some(&1));
        assert_eq!(counts.get("weak_false"), None);
    }
}
