use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ModelStatus;

/// Free-form training parameters handed to a model provider.
pub type TrainParams = BTreeMap<String, serde_json::Value>;

/// Tag naming a model family, e.g. `svm_ensemble`. Model families are
/// values: a provider is registered per tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelType(String);

impl ModelType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Training label counts plus the parameters the model was trained with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetadata {
    /// Detailed label name (`true`, `false`, `weak_true`, `weak_false`) → count.
    pub train_counts: BTreeMap<String, usize>,
    pub params: TrainParams,
}

/// Model record attached to an iteration. The artifact itself is owned by
/// the provider; this is only the handle and its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub model_status: ModelStatus,
    pub model_type: ModelType,
    pub metadata: ModelMetadata,
    pub created_at: DateTime<Utc>,
}

impl ModelInfo {
    /// A freshly submitted model, still training.
    pub fn training(model_id: impl Into<String>, model_type: ModelType, metadata: ModelMetadata) -> Self {
        Self {
            model_id: model_id.into(),
            model_status: ModelStatus::Training,
            model_type,
            metadata,
            created_at: Utc::now(),
        }
    }
}
