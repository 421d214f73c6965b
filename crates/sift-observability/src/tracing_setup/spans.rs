//! Span definitions for the iteration lifecycle, the retraining trigger,
//! and catch-up inference.

/// Span covering one iteration's train → infer → recommend chain.
#[macro_export]
macro_rules! iteration_span {
    ($workspace:expr, $category:expr, $iteration:expr) => {
        tracing::info_span!(
            "sift.iteration",
            workspace = %$workspace,
            category = %$category,
            iteration = $iteration
        )
    };
}

/// Span covering one `train_if_recommended` evaluation.
#[macro_export]
macro_rules! trigger_span {
    ($workspace:expr, $category:expr, $force:expr) => {
        tracing::info_span!(
            "sift.trigger",
            workspace = %$workspace,
            category = %$category,
            force = $force
        )
    };
}

/// Span covering one catch-up inference job.
#[macro_export]
macro_rules! catch_up_span {
    ($workspace:expr, $category:expr, $iteration:expr) => {
        tracing::info_span!(
            "sift.catch_up",
            workspace = %$workspace,
            category = %$category,
            iteration = $iteration
        )
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const ITERATION: &str = "sift.iteration";
    pub const TRIGGER: &str = "sift.trigger";
    pub const CATCH_UP: &str = "sift.catch_up";
}
