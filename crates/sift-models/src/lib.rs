//! # sift-models
//!
//! Everything the orchestrator needs to reach a model: the registry of
//! providers by model type, the policy that picks a type per iteration,
//! and a caching decorator around providers.

pub mod cache;
pub mod caching_provider;
pub mod policy;
pub mod registry;

pub use cache::InferenceCache;
pub use caching_provider::CachingProvider;
pub use policy::ModelPolicy;
pub use registry::ModelRegistry;
