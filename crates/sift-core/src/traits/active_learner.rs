use crate::errors::SiftResult;
use crate::models::{Prediction, TextElement};

/// Input of one recommendation round. `predictions[i]` belongs to `candidates[i]`.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRequest<'a> {
    pub workspace_id: &'a str,
    pub dataset_name: &'a str,
    pub category: &'a str,
    pub candidates: &'a [TextElement],
    pub predictions: &'a [Prediction],
    pub sample_size: usize,
}

/// Ranks unlabeled elements by how useful labeling them would be.
pub trait IActiveLearner: Send + Sync {
    fn name(&self) -> &str;

    /// At most `sample_size` element ids, most informative first.
    fn recommend(&self, request: &RecommendationRequest<'_>) -> SiftResult<Vec<String>>;
}
