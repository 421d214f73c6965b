use std::path::PathBuf;

use crate::errors::ModelError;
use crate::models::{ModelStatus, ModelType, Prediction, TextElement, TrainParams, TrainingExample};

/// Capability interface of one model family.
///
/// `train` and `infer` block; the orchestrator runs them on its job pool.
pub trait IModelProvider: Send + Sync {
    fn model_type(&self) -> &ModelType;

    /// Reserve a model id before training starts.
    fn create_model(&self, params: &TrainParams) -> Result<String, ModelError>;

    fn train(
        &self,
        model_id: &str,
        examples: &[TrainingExample],
        params: &TrainParams,
    ) -> Result<(), ModelError>;

    /// One prediction per element, in order. `use_cache` lets the provider
    /// answer repeated (model, element) queries from its cache.
    fn infer(
        &self,
        model_id: &str,
        elements: &[TextElement],
        use_cache: bool,
    ) -> Result<Vec<Prediction>, ModelError>;

    fn status(&self, model_id: &str) -> Result<ModelStatus, ModelError>;

    fn delete(&self, model_id: &str) -> Result<(), ModelError>;

    /// Write the model somewhere portable and return the location.
    fn export(&self, model_id: &str) -> Result<PathBuf, ModelError>;
}
