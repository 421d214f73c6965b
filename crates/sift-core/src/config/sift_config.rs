//! Top-level sift configuration with layered resolution.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    ActiveLearningConfig, InferenceCacheConfig, JobsConfig, ObservabilityConfig,
    RetentionConfig, StorageConfig, TrainingConfig,
};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sections.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`SIFT_*`)
/// 2. Config file passed to [`SiftConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiftConfig {
    pub storage: StorageConfig,
    pub training: TrainingConfig,
    pub active_learning: ActiveLearningConfig,
    pub retention: RetentionConfig,
    pub jobs: JobsConfig,
    pub inference_cache: InferenceCacheConfig,
    pub observability: ObservabilityConfig,
}

impl SiftConfig {
    /// Load from `path` (when it exists), apply `SIFT_*` overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|_| {
                    ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    }
                })?;
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        config.apply_overrides_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `SIFT_*` overrides read through `lookup`. Unparseable values
    /// are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }

        if let Some(v) = lookup("SIFT_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Some(v) = parsed(&lookup, "SIFT_READ_POOL_SIZE") {
            self.storage.read_pool_size = v;
        }
        if let Some(v) = parsed(&lookup, "SIFT_FIRST_MODEL_POSITIVE_THRESHOLD") {
            self.training.first_model_positive_threshold = v;
        }
        if let Some(v) = parsed(&lookup, "SIFT_CHANGED_ELEMENT_THRESHOLD") {
            self.training.changed_element_threshold = v;
        }
        if let Some(v) = lookup("SIFT_MODEL_TYPE") {
            self.training.model_policy.initial = v;
        }
        if let Some(v) = parsed(&lookup, "SIFT_SUGGESTION_COUNT") {
            self.active_learning.suggestion_count = v;
        }
        if let Some(v) = parsed(&lookup, "SIFT_MODELS_TO_KEEP") {
            self.retention.models_to_keep = v;
        }
        if let Some(v) = parsed(&lookup, "SIFT_WORKER_COUNT") {
            self.jobs.worker_count = v;
        }
        if let Some(v) = parsed(&lookup, "SIFT_CATCH_UP_POLL_INTERVAL_MS") {
            self.jobs.catch_up_poll_interval_ms = v;
        }
        if let Some(v) = parsed(&lookup, "SIFT_CATCH_UP_TIMEOUT_MS") {
            self.jobs.catch_up_timeout_ms = v;
        }
        if let Some(v) = parsed(&lookup, "SIFT_INFERENCE_CACHE_ENABLED") {
            self.inference_cache.enabled = v;
        }
        if let Some(v) = lookup("SIFT_LOG_LEVEL") {
            self.observability.log_level = v;
        }
        if let Some(v) = parsed(&lookup, "SIFT_LOG_JSON") {
            self.observability.json = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &str, value: u64| {
            if value == 0 {
                Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                })
            } else {
                Ok(())
            }
        };

        positive("storage.read_pool_size", self.storage.read_pool_size as u64)?;
        positive("retention.models_to_keep", self.retention.models_to_keep as u64)?;
        positive("jobs.worker_count", self.jobs.worker_count as u64)?;
        positive("jobs.catch_up_poll_interval_ms", self.jobs.catch_up_poll_interval_ms)?;
        positive("jobs.catch_up_timeout_ms", self.jobs.catch_up_timeout_ms)?;
        positive("jobs.status_channel_capacity", self.jobs.status_channel_capacity as u64)?;
        positive("active_learning.suggestion_count", self.active_learning.suggestion_count as u64)?;

        if self.training.model_policy.initial.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "training.model_policy.initial".to_string(),
                message: "must name a model type".to_string(),
            });
        }
        if self.inference_cache.enabled {
            positive("inference_cache.max_entries", self.inference_cache.max_entries)?;
        }
        Ok(())
    }
}
