pub mod defaults;
pub mod jobs_config;
pub mod observability_config;
pub mod sift_config;
pub mod storage_config;
pub mod training_config;

pub use jobs_config::JobsConfig;
pub use observability_config::ObservabilityConfig;
pub use sift_config::SiftConfig;
pub use storage_config::{InferenceCacheConfig, StorageConfig};
pub use training_config::{ActiveLearningConfig, ModelPolicyConfig, RetentionConfig, TrainingConfig};
