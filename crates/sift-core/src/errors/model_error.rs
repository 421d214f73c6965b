/// Errors raised by model providers and by model outputs.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("no model provider registered for model type '{model_type}'")]
    UnknownModelType { model_type: String },

    #[error("model {model_id} not found")]
    ModelNotFound { model_id: String },

    #[error("training failed for model {model_id}: {reason}")]
    TrainingFailed { model_id: String, reason: String },

    #[error("inference failed for model {model_id}: {reason}")]
    InferenceFailed { model_id: String, reason: String },

    #[error("export failed for model {model_id}: {reason}")]
    ExportFailed { model_id: String, reason: String },

    #[error("deleting model {model_id} failed: {reason}")]
    DeletionFailed { model_id: String, reason: String },

    #[error("model score {score} is outside the range [0, 1]")]
    ScoreOutOfRange { score: f64 },
}
