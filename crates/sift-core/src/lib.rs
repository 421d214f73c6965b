//! # sift-core
//!
//! Foundation crate for the sift active-learning control plane.
//! Defines the data model (workspaces, categories, iterations, models),
//! the collaborator traits the orchestrator is wired against, errors,
//! config, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::SiftConfig;
pub use errors::{SiftError, SiftResult};
pub use models::{
    Category, Iteration, IterationStatus, ModelInfo, ModelStatus, ModelType, Prediction,
    TextElement, Workspace,
};
