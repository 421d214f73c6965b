//! Catch-up inference after new documents arrive.
//!
//! A single worker drains the queue in order. Each job waits for its
//! iteration to settle, then infers the whole corpus with that iteration's
//! model so later queries hit the provider cache. Jobs are fire-and-forget:
//! failures and timeouts are logged and never retried.

use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use sift_core::errors::SiftResult;
use sift_core::models::IterationStatus;
use sift_observability::tracing_setup::events;

use crate::engine::Shared;
use crate::inference;
use crate::iteration::wait;

#[derive(Debug, Clone)]
pub(crate) struct CatchUpJob {
    pub(crate) job_id: Uuid,
    pub(crate) workspace_id: String,
    pub(crate) category: String,
    pub(crate) dataset_name: String,
    pub(crate) iteration: usize,
}

impl CatchUpJob {
    pub(crate) fn new(workspace_id: &str, category: &str, dataset_name: &str, iteration: usize) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            workspace_id: workspace_id.to_string(),
            category: category.to_string(),
            dataset_name: dataset_name.to_string(),
            iteration,
        }
    }
}

enum Outcome {
    Inferred(usize),
    Failed,
    TimedOut,
}

/// Runs until the orchestrator is dropped.
pub(crate) async fn worker(shared: Weak<Shared>, mut jobs: mpsc::UnboundedReceiver<CatchUpJob>) {
    while let Some(job) = jobs.recv().await {
        let Some(shared) = shared.upgrade() else {
            break;
        };
        let span = sift_observability::catch_up_span!(job.workspace_id, job.category, job.iteration);
        run(&shared, &job).instrument(span).await;
    }
    tracing::debug!("catch-up worker stopped");
}

async fn run(shared: &Arc<Shared>, job: &CatchUpJob) {
    tracing::debug!(job_id = %job.job_id, "catch-up job started");
    match process(shared, job).await {
        Ok(Outcome::Inferred(elements)) => {
            shared.metrics.record_catch_up_completed();
            events::catch_up_completed(&job.workspace_id, &job.category, job.iteration, elements);
        }
        Ok(Outcome::Failed) => {
            shared.metrics.record_catch_up_aborted();
            events::catch_up_aborted(&job.workspace_id, &job.category, job.iteration, "iteration status is ERROR");
        }
        Ok(Outcome::TimedOut) => {
            shared.metrics.record_catch_up_timed_out();
            events::catch_up_aborted(
                &job.workspace_id,
                &job.category,
                job.iteration,
                "timed out waiting for the iteration",
            );
        }
        Err(err) => {
            shared.metrics.record_catch_up_aborted();
            events::catch_up_aborted(&job.workspace_id, &job.category, job.iteration, &err.to_string());
        }
    }
}

async fn process(shared: &Arc<Shared>, job: &CatchUpJob) -> SiftResult<Outcome> {
    let jobs_config = &shared.config.jobs;
    let settled = wait::wait_for_terminal(
        &shared.store,
        &job.workspace_id,
        &job.category,
        job.iteration,
        jobs_config.catch_up_poll_interval(),
        jobs_config.catch_up_timeout(),
    )
    .await?;

    match settled {
        None => return Ok(Outcome::TimedOut),
        Some(IterationStatus::Error) => return Ok(Outcome::Failed),
        Some(_) => {}
    }

    let worker_shared = Arc::clone(shared);
    let job = job.clone();
    let inferred = shared
        .pool
        .run(move || {
            let elements = worker_shared.labels.all_elements(&job.workspace_id, &job.dataset_name)?;
            inference::infer(&worker_shared, &job.workspace_id, &job.category, &elements, Some(job.iteration))?;
            Ok(elements.len())
        })
        .await?;
    Ok(Outcome::Inferred(inferred))
}
