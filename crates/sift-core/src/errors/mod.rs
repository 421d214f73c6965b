//! Error handling for sift.
//! One error enum per subsystem, `thiserror` only, aggregated by [`SiftError`].

pub mod config_error;
pub mod model_error;
pub mod sift_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use model_error::ModelError;
pub use sift_error::{SiftError, SiftResult};
pub use storage_error::StorageError;
