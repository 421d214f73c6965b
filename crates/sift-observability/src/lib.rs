//! # sift-observability
//!
//! Tracing subscriber setup, span macros and structured events for the
//! iteration lifecycle, and the orchestrator's counters.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{MetricsSnapshot, OrchestratorMetrics};
pub use tracing_setup::init_tracing;
