//! Waiting for an iteration to settle.
//!
//! Status changes published by the state store wake the waiter; polling at
//! `poll` intervals covers stores without a feed and lagged receivers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;

use sift_core::errors::SiftResult;
use sift_core::models::{IterationStatus, StatusChange};
use sift_core::traits::IStateStore;

/// The terminal status of the iteration, or `None` when `timeout` passed
/// first.
pub(crate) async fn wait_for_terminal(
    store: &Arc<dyn IStateStore>,
    workspace_id: &str,
    category: &str,
    index: usize,
    poll: Duration,
    timeout: Duration,
) -> SiftResult<Option<IterationStatus>> {
    // Subscribe before the first read so no change slips between the two.
    let mut feed = store.subscribe();
    let deadline = Instant::now() + timeout;
    loop {
        let status = store.get_iteration(workspace_id, category, index)?.status;
        if status.is_terminal() {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        let wake_at = (now + poll).min(deadline);
        match feed.as_mut() {
            Some(receiver) => next_change(receiver, workspace_id, category, index, wake_at).await,
            None => tokio::time::sleep_until(wake_at).await,
        }
    }
}

/// Return once a change for this iteration arrives or at `wake_at`.
async fn next_change(
    receiver: &mut broadcast::Receiver<StatusChange>,
    workspace_id: &str,
    category: &str,
    index: usize,
    wake_at: Instant,
) {
    loop {
        match tokio::time::timeout_at(wake_at, receiver.recv()).await {
            Err(_) => return,
            Ok(Ok(change)) => {
                if change.workspace_id == workspace_id && change.category == category && change.iteration == index {
                    return;
                }
            }
            Ok(Err(RecvError::Lagged(skipped))) => {
                tracing::debug!(skipped, "status feed lagged, re-reading");
                return;
            }
            Ok(Err(RecvError::Closed)) => {
                tokio::time::sleep_until(wake_at).await;
                return;
            }
        }
    }
}
