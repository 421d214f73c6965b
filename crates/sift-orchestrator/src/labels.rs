//! Labeling operations: writing labels, paging recommendations, and
//! precision estimates from labeled samples.

use std::collections::{BTreeMap, BTreeSet};

use sift_core::constants::stats;
use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::{LabelAssignments, LabelCounts, TextElement};

use crate::engine::Orchestrator;
use crate::statistics;

impl Orchestrator {
    /// Write labels. With `update_counter`, each touched category's change
    /// counter first grows by the number of elements labeled for it, which
    /// may make the next [`train_if_recommended`](Self::train_if_recommended)
    /// fire.
    pub fn set_labels(
        &self,
        workspace_id: &str,
        assignments: &LabelAssignments,
        apply_to_duplicates: bool,
        update_counter: bool,
    ) -> SiftResult<()> {
        let dataset_name = self.inner.dataset_name(workspace_id)?;
        if update_counter {
            for (category, changes) in changes_per_category(assignments) {
                self.inner
                    .store
                    .increase_label_change_count(workspace_id, &category, changes)?;
            }
        }
        self.inner
            .labels
            .set_labels(workspace_id, &dataset_name, assignments, apply_to_duplicates)
    }

    pub fn unset_labels(
        &self,
        workspace_id: &str,
        category: &str,
        element_ids: &[String],
        apply_to_duplicates: bool,
    ) -> SiftResult<()> {
        let dataset_name = self.inner.dataset_name(workspace_id)?;
        self.inner
            .labels
            .unset_labels(workspace_id, &dataset_name, category, element_ids, apply_to_duplicates)
    }

    pub fn label_counts(&self, workspace_id: &str, category: &str, remove_duplicates: bool) -> SiftResult<LabelCounts> {
        let dataset_name = self.inner.dataset_name(workspace_id)?;
        self.inner
            .labels
            .label_counts(workspace_id, &dataset_name, category, remove_duplicates)
    }

    /// Up to `count` elements recommended by the latest READY iteration,
    /// starting at `start`. A `start` past the end of the list fails.
    pub fn elements_to_label(
        &self,
        workspace_id: &str,
        category: &str,
        count: usize,
        start: usize,
    ) -> SiftResult<Vec<TextElement>> {
        let recommended = self.inner.store.current_recommendations(workspace_id, category)?;
        if start > recommended.len() {
            return Err(SiftError::RecommendationsOutOfRange {
                workspace_id: workspace_id.to_string(),
                category: category.to_string(),
                start,
                available: recommended.len(),
            });
        }
        let end = start.saturating_add(count).min(recommended.len());
        let dataset_name = self.inner.dataset_name(workspace_id)?;
        self.inner
            .labels
            .elements_by_ids(workspace_id, &dataset_name, &recommended[start..end])
    }

    /// Precision of `iteration` estimated from the labeled sample `ids`:
    /// the share of sampled elements whose label is positive. Stored on the
    /// iteration's statistics. `changed_elements` is added to the change
    /// counter only after the estimate is recorded.
    pub fn estimate_precision(
        &self,
        workspace_id: &str,
        category: &str,
        ids: &[String],
        changed_elements: u64,
        iteration: usize,
    ) -> SiftResult<f64> {
        let dataset_name = self.inner.dataset_name(workspace_id)?;
        let sample = self.inner.labels.elements_by_ids(workspace_id, &dataset_name, ids)?;
        if sample.len() != ids.len() {
            let found: BTreeSet<&str> = sample.iter().map(|element| element.id.as_str()).collect();
            let missing: Vec<&str> = ids
                .iter()
                .map(String::as_str)
                .filter(|id| !found.contains(id))
                .collect();
            return Err(SiftError::InvalidInput {
                reason: format!(
                    "cannot estimate precision of category '{category}': unknown element ids {missing:?}"
                ),
            });
        }
        let positives = sample
            .iter()
            .filter(|element| element.label_for(category).is_some_and(|label| label.positive))
            .count();
        let precision = statistics::precision(positives, sample.len()).ok_or_else(|| SiftError::InvalidInput {
            reason: format!("cannot estimate precision of category '{category}' from an empty sample"),
        })?;

        let mut recorded = BTreeMap::new();
        recorded.insert(stats::ESTIMATED_PRECISION.to_string(), precision);
        recorded.insert(stats::ESTIMATED_PRECISION_NUM_ELEMENTS.to_string(), ids.len() as f64);
        self.inner
            .store
            .add_iteration_statistics(workspace_id, category, iteration, &recorded)?;
        self.inner
            .store
            .increase_label_change_count(workspace_id, category, changed_elements)?;

        tracing::info!(
            workspace = workspace_id,
            category,
            iteration,
            precision,
            sampled = sample.len(),
            "precision estimated"
        );
        Ok(precision)
    }
}

/// Category → number of elements in `assignments` labeled for it.
fn changes_per_category(assignments: &LabelAssignments) -> BTreeMap<String, u64> {
    let mut changes = BTreeMap::new();
    for categories in assignments.values() {
        for category in categories.keys() {
            *changes.entry(category.clone()).or_insert(0) += 1;
        }
    }
    changes
}
