//! Compiled defaults for every config section.

// Storage
pub const DEFAULT_DB_PATH: &str = "sift.db";
pub const DEFAULT_WAL_ENABLED: bool = true;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// Training trigger
pub const DEFAULT_FIRST_MODEL_POSITIVE_THRESHOLD: usize = 20;
pub const DEFAULT_CHANGED_ELEMENT_THRESHOLD: u64 = 20;
pub const DEFAULT_MODEL_TYPE: &str = "svm_ensemble";
pub const DEFAULT_APPLY_LABELS_TO_DUPLICATE_TEXTS: bool = true;

// Active learning
pub const DEFAULT_SUGGESTION_COUNT: usize = 1_000;

// Retention
pub const DEFAULT_MODELS_TO_KEEP: usize = 2;

// Jobs
pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_CATCH_UP_POLL_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_CATCH_UP_TIMEOUT_MS: u64 = 15 * 60 * 1_000;
pub const DEFAULT_STATUS_CHANNEL_CAPACITY: usize = 256;

// Inference cache
pub const DEFAULT_INFERENCE_CACHE_ENABLED: bool = true;
pub const DEFAULT_INFERENCE_CACHE_MAX_ENTRIES: u64 = 100_000;
pub const DEFAULT_INFERENCE_CACHE_TTI_SECS: u64 = 3_600;

// Observability
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_JSON: bool = false;
