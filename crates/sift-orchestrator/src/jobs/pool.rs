//! Bounded pool for blocking provider work.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, Semaphore};

use sift_core::errors::{SiftError, SiftResult};

/// Runs blocking closures on the runtime's blocking threads, at most
/// `worker_count` at a time.
#[derive(Clone)]
pub struct JobPool {
    permits: Arc<Semaphore>,
    runtime: Handle,
}

impl JobPool {
    pub fn new(runtime: Handle, worker_count: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(worker_count.max(1))),
            runtime,
        }
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Run `job` once a worker is free. A panicking job becomes `JobFailed`.
    pub async fn run<T, F>(&self, job: F) -> SiftResult<T>
    where
        F: FnOnce() -> SiftResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let _permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| SiftError::JobFailed {
                reason: "job pool is closed".to_string(),
            })?;
        match tokio::task::spawn_blocking(job).await {
            Ok(result) => result,
            Err(join_error) => Err(SiftError::JobFailed {
                reason: join_error.to_string(),
            }),
        }
    }

    /// Run `job` in the background and deliver `wrap(result)` on
    /// `completions`. The send is dropped when the receiver is gone.
    pub fn submit<T, E, F, W>(&self, job: F, wrap: W, completions: mpsc::UnboundedSender<E>)
    where
        F: FnOnce() -> SiftResult<T> + Send + 'static,
        T: Send + 'static,
        W: FnOnce(SiftResult<T>) -> E + Send + 'static,
        E: Send + 'static,
    {
        let pool = self.clone();
        self.runtime.spawn(async move {
            let result = pool.run(job).await;
            let _ = completions.send(wrap(result));
        });
    }
}
