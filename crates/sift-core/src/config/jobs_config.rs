use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Background job pool and catch-up queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Concurrent training/inference jobs.
    pub worker_count: usize,
    pub catch_up_poll_interval_ms: u64,
    pub catch_up_timeout_ms: u64,
    /// Buffered status-change notifications per subscriber.
    pub status_channel_capacity: usize,
}

impl JobsConfig {
    pub fn catch_up_poll_interval(&self) -> Duration {
        Duration::from_millis(self.catch_up_poll_interval_ms)
    }

    pub fn catch_up_timeout(&self) -> Duration {
        Duration::from_millis(self.catch_up_timeout_ms)
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            worker_count: defaults::DEFAULT_WORKER_COUNT,
            catch_up_poll_interval_ms: defaults::DEFAULT_CATCH_UP_POLL_INTERVAL_MS,
            catch_up_timeout_ms: defaults::DEFAULT_CATCH_UP_TIMEOUT_MS,
            status_channel_capacity: defaults::DEFAULT_STATUS_CHANNEL_CAPACITY,
        }
    }
}
