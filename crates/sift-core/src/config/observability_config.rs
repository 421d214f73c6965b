use serde::{Deserialize, Serialize};

use super::defaults;

/// Logging configuration. `SIFT_LOG` overrides `log_level` at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            json: defaults::DEFAULT_LOG_JSON,
        }
    }
}
