//! Counters of lifecycle outcomes, shared by every orchestrator task.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Lock-free lifecycle counters.
#[derive(Debug, Default)]
pub struct OrchestratorMetrics {
    iterations_started: AtomicU64,
    iterations_ready: AtomicU64,
    iterations_failed: AtomicU64,
    trigger_fired: AtomicU64,
    trigger_suppressed: AtomicU64,
    models_deleted: AtomicU64,
    retention_failures: AtomicU64,
    catch_up_completed: AtomicU64,
    catch_up_aborted: AtomicU64,
    catch_up_timed_out: AtomicU64,
}

/// Point-in-time copy of [`OrchestratorMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub iterations_started: u64,
    pub iterations_ready: u64,
    pub iterations_failed: u64,
    pub trigger_fired: u64,
    pub trigger_suppressed: u64,
    pub models_deleted: u64,
    pub retention_failures: u64,
    pub catch_up_completed: u64,
    pub catch_up_aborted: u64,
    pub catch_up_timed_out: u64,
}

macro_rules! counters {
    ($($field:ident => $record:ident),* $(,)?) => {
        impl OrchestratorMetrics {
            $(
                pub fn $record(&self) {
                    self.$field.fetch_add(1, Ordering::Relaxed);
                }
            )*

            pub fn snapshot(&self) -> MetricsSnapshot {
                MetricsSnapshot {
                    $($field: self.$field.load(Ordering::Relaxed),)*
                }
            }
        }
    };
}

counters! {
    iterations_started => record_iteration_started,
    iterations_ready => record_iteration_ready,
    iterations_failed => record_iteration_failed,
    trigger_fired => record_trigger_fired,
    trigger_suppressed => record_trigger_suppressed,
    models_deleted => record_model_deleted,
    retention_failures => record_retention_failure,
    catch_up_completed => record_catch_up_completed,
    catch_up_aborted => record_catch_up_aborted,
    catch_up_timed_out => record_catch_up_timed_out,
}

impl OrchestratorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}
