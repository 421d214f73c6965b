//! Default training-set selection.

use sift_core::errors::SiftResult;
use sift_core::models::TrainingExample;
use sift_core::traits::{ILabelStore, ITrainingSetSelector};

/// Trains on every element labeled for the category, weak labels included.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllLabeledSelector;

impl ITrainingSetSelector for AllLabeledSelector {
    fn training_set(
        &self,
        labels: &dyn ILabelStore,
        workspace_id: &str,
        dataset_name: &str,
        category: &str,
    ) -> SiftResult<Vec<TrainingExample>> {
        let examples = labels
            .labeled_elements(workspace_id, dataset_name, category)?
            .into_iter()
            .filter_map(|element| {
                let label = *element.label_for(category)?;
                Some(TrainingExample {
                    element_id: element.id,
                    text: element.text,
                    label,
                })
            })
            .collect();
        Ok(examples)
    }
}
