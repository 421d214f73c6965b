//! Structured log events for the iteration lifecycle.
//!
//! Each function emits a `tracing` event with structured fields.

/// A new iteration was submitted for training.
pub fn iteration_started(workspace: &str, category: &str, iteration: usize, model_id: &str, model_type: &str) {
    tracing::info!(
        event = "iteration_started",
        workspace = %workspace,
        category = %category,
        iteration = iteration,
        model_id = %model_id,
        model_type = %model_type,
        "starting iteration in background"
    );
}

/// Training finished and full-corpus inference was submitted.
pub fn training_completed(workspace: &str, category: &str, iteration: usize, model_id: &str) {
    tracing::info!(
        event = "training_completed",
        workspace = %workspace,
        category = %category,
        iteration = iteration,
        model_id = %model_id,
        "training done, running inference over the full dataset"
    );
}

/// The iteration reached READY.
pub fn iteration_finished(workspace: &str, category: &str, iteration: usize, recommendations: usize) {
    tracing::info!(
        event = "iteration_finished",
        workspace = %workspace,
        category = %category,
        iteration = iteration,
        recommendations = recommendations,
        "iteration finished"
    );
}

/// The iteration was marked ERROR.
pub fn iteration_failed(workspace: &str, category: &str, iteration: usize, phase: &str, error: &str) {
    tracing::error!(
        event = "iteration_failed",
        workspace = %workspace,
        category = %category,
        iteration = iteration,
        phase = %phase,
        error = %error,
        "iteration failed"
    );
}

/// Post-train statistics were recorded.
pub fn statistics_recorded(workspace: &str, category: &str, iteration: usize, statistics: &std::collections::BTreeMap<String, f64>) {
    tracing::info!(
        event = "statistics_recorded",
        workspace = %workspace,
        category = %category,
        iteration = iteration,
        statistics = ?statistics,
        "post train measurements"
    );
}

/// A model artifact was deleted.
pub fn model_deleted(workspace: &str, category: &str, iteration: usize, model_id: &str) {
    tracing::info!(
        event = "model_deleted",
        workspace = %workspace,
        category = %category,
        iteration = iteration,
        model_id = %model_id,
        "model marked deleted"
    );
}

/// The retraining trigger declined to start an iteration.
pub fn trigger_suppressed(workspace: &str, category: &str, reason: &str) {
    tracing::debug!(
        event = "trigger_suppressed",
        workspace = %workspace,
        category = %category,
        reason = %reason,
        "not training a new model"
    );
}

/// A catch-up job gave up.
pub fn catch_up_aborted(workspace: &str, category: &str, iteration: usize, reason: &str) {
    tracing::warn!(
        event = "catch_up_aborted",
        workspace = %workspace,
        category = %category,
        iteration = iteration,
        reason = %reason,
        "skipping inference of newly added documents"
    );
}

/// A catch-up job inferred the corpus.
pub fn catch_up_completed(workspace: &str, category: &str, iteration: usize, elements: usize) {
    tracing::info!(
        event = "catch_up_completed",
        workspace = %workspace,
        category = %category,
        iteration = iteration,
        elements = elements,
        "inferred newly added documents"
    );
}
