use serde::{Deserialize, Serialize};

use super::defaults;

/// Which model type to train for the n-th iteration of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPolicyConfig {
    pub initial: String,
    /// Model type used once `switch_after` non-failed iterations exist.
    pub switch_to: Option<String>,
    pub switch_after: usize,
}

impl Default for ModelPolicyConfig {
    fn default() -> Self {
        Self {
            initial: defaults::DEFAULT_MODEL_TYPE.to_string(),
            switch_to: None,
            switch_after: 0,
        }
    }
}

/// Retraining trigger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Minimum positive labels before the trigger fires.
    pub first_model_positive_threshold: usize,
    /// Minimum label changes since the last train before the trigger fires.
    pub changed_element_threshold: u64,
    pub model_policy: ModelPolicyConfig,
    pub apply_labels_to_duplicate_texts: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            first_model_positive_threshold: defaults::DEFAULT_FIRST_MODEL_POSITIVE_THRESHOLD,
            changed_element_threshold: defaults::DEFAULT_CHANGED_ELEMENT_THRESHOLD,
            model_policy: ModelPolicyConfig::default(),
            apply_labels_to_duplicate_texts: defaults::DEFAULT_APPLY_LABELS_TO_DUPLICATE_TEXTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveLearningConfig {
    /// Recommendations stored per iteration.
    pub suggestion_count: usize,
}

impl Default for ActiveLearningConfig {
    fn default() -> Self {
        Self {
            suggestion_count: defaults::DEFAULT_SUGGESTION_COUNT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// READY model artifacts kept, counting the finishing iteration.
    pub models_to_keep: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            models_to_keep: defaults::DEFAULT_MODELS_TO_KEEP,
        }
    }
}
