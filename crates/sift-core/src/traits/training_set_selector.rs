use crate::errors::SiftResult;
use crate::models::TrainingExample;

use super::ILabelStore;

/// Chooses the examples a new model is trained on.
pub trait ITrainingSetSelector: Send + Sync {
    fn training_set(
        &self,
        labels: &dyn ILabelStore,
        workspace_id: &str,
        dataset_name: &str,
        category: &str,
    ) -> SiftResult<Vec<TrainingExample>>;
}
