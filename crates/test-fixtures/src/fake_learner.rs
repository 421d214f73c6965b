//! An active learner that keeps candidate order.

use std::sync::atomic::{AtomicUsize, Ordering};

use sift_core::errors::SiftResult;
use sift_core::traits::{IActiveLearner, RecommendationRequest};

/// Recommends candidates in the order given, up to the sample size.
#[derive(Default)]
pub struct FixedOrderLearner {
    calls: AtomicUsize,
}

impl FixedOrderLearner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IActiveLearner for FixedOrderLearner {
    fn name(&self) -> &str {
        "fixed_order"
    }

    fn recommend(&self, request: &RecommendationRequest<'_>) -> SiftResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(request
            .candidates
            .iter()
            .take(request.sample_size)
            .map(|el| el.id.clone())
            .collect())
    }
}
