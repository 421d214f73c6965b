//! Iteration lifecycle: submission, the per-iteration coordinator and its
//! state machine, plus iteration queries.

pub(crate) mod coordinator;
pub(crate) mod start;
pub mod state_machine;
pub(crate) mod wait;

use std::path::PathBuf;
use std::time::Duration;

use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::{Iteration, IterationStatus, ModelStatus};

use crate::engine::Orchestrator;

impl Orchestrator {
    /// Every iteration of the category, by index.
    pub fn iterations(&self, workspace_id: &str, category: &str) -> SiftResult<Vec<Iteration>> {
        self.inner.store.get_iterations(workspace_id, category)
    }

    pub fn iteration_status(&self, workspace_id: &str, category: &str, iteration: usize) -> SiftResult<IterationStatus> {
        Ok(self.inner.store.get_iteration(workspace_id, category, iteration)?.status)
    }

    pub fn iterations_by_status(
        &self,
        workspace_id: &str,
        category: &str,
        status: IterationStatus,
    ) -> SiftResult<Vec<Iteration>> {
        self.inner.store.iterations_by_status(workspace_id, category, status)
    }

    /// Wait until the iteration is READY or ERROR and return that status.
    /// Fails with `WaitTimedOut` after `timeout`.
    pub async fn wait_for_iteration(
        &self,
        workspace_id: &str,
        category: &str,
        iteration: usize,
        timeout: Duration,
    ) -> SiftResult<IterationStatus> {
        let poll = self.inner.config.jobs.catch_up_poll_interval();
        wait::wait_for_terminal(&self.inner.store, workspace_id, category, iteration, poll, timeout)
            .await?
            .ok_or_else(|| SiftError::WaitTimedOut {
                workspace_id: workspace_id.to_string(),
                category: category.to_string(),
                iteration,
                waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })
    }

    /// Ask the provider to export the iteration's model and return where it
    /// was written. The model must be READY.
    pub fn export_model(&self, workspace_id: &str, category: &str, iteration: usize) -> SiftResult<PathBuf> {
        let record = self.inner.store.get_iteration(workspace_id, category, iteration)?;
        if record.model.model_status != ModelStatus::Ready {
            return Err(SiftError::ModelNotReady {
                workspace_id: workspace_id.to_string(),
                category: category.to_string(),
                iteration,
                status: record.model.model_status,
            });
        }
        let provider = self.inner.models.get(&record.model.model_type)?;
        let location = provider.export(&record.model.model_id)?;
        tracing::info!(
            workspace = workspace_id,
            category,
            iteration,
            location = %location.display(),
            "model exported"
        );
        Ok(location)
    }
}
