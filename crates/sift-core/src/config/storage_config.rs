use serde::{Deserialize, Serialize};

use super::defaults;

/// SQLite state store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub wal_enabled: bool,
    pub busy_timeout_ms: u64,
    /// Number of read-only connections.
    pub read_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_PATH.to_string(),
            wal_enabled: defaults::DEFAULT_WAL_ENABLED,
            busy_timeout_ms: defaults::DEFAULT_BUSY_TIMEOUT_MS,
            read_pool_size: defaults::DEFAULT_READ_POOL_SIZE,
        }
    }
}

/// Provider-side cache of (model, element text) → prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceCacheConfig {
    pub enabled: bool,
    pub max_entries: u64,
    /// Entries idle longer than this are evicted.
    pub time_to_idle_secs: u64,
}

impl Default for InferenceCacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_INFERENCE_CACHE_ENABLED,
            max_entries: defaults::DEFAULT_INFERENCE_CACHE_MAX_ENTRIES,
            time_to_idle_secs: defaults::DEFAULT_INFERENCE_CACHE_TTI_SECS,
        }
    }
}
