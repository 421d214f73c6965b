//! Per-iteration statistics, precision estimation and labeling progress.
//!
//! Everything here is pure; the orchestrator feeds it predictions and
//! counts it has already fetched.

use sift_core::models::{Iteration, IterationStatus, Prediction};

/// Share of `predictions` that are positive. 0 for an empty corpus.
pub fn positive_fraction(predictions: &[Prediction]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let positives = predictions.iter().filter(|p| p.label()).count();
    positives as f64 / predictions.len() as f64
}

/// Share of labels that flipped between two prediction runs over the same
/// elements. `None` when the runs cover different element counts.
pub fn changed_fraction(previous: &[Prediction], current: &[Prediction]) -> Option<f64> {
    if previous.len() != current.len() {
        return None;
    }
    if current.is_empty() {
        return Some(0.0);
    }
    let changed = previous
        .iter()
        .zip(current)
        .filter(|(before, after)| before.label() != after.label())
        .count();
    Some(changed as f64 / current.len() as f64)
}

/// The most recent iteration before `index` that reached READY.
pub fn previous_ready(iterations: &[Iteration], index: usize) -> Option<&Iteration> {
    iterations
        .iter()
        .filter(|it| it.index < index && it.status == IterationStatus::Ready)
        .max_by_key(|it| it.index)
}

/// `positives / sampled`, or `None` for an empty sample.
pub fn precision(positives: usize, sampled: usize) -> Option<f64> {
    (sampled > 0).then(|| positives as f64 / sampled as f64)
}

/// How close a category is to triggering a new model, in percent: the
/// smaller of change progress and positive-label progress, each clamped to
/// 0..=100. A zero threshold counts as already met.
pub fn progress(positives: usize, changes: u64, positive_threshold: usize, change_threshold: u64) -> u32 {
    if positives == 0 {
        return 0;
    }
    let ratio = |value: f64, threshold: f64| -> u32 {
        if threshold <= 0.0 {
            return 100;
        }
        (value / threshold * 100.0).round().clamp(0.0, 100.0) as u32
    };
    let change_progress = ratio(changes as f64, change_threshold as f64);
    let positive_progress = ratio(positives as f64, positive_threshold as f64);
    change_progress.min(positive_progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sift_core::models::{ModelInfo, ModelMetadata, ModelType};

    fn pred(label: bool) -> Prediction {
        Prediction::new(label, if label { 0.8 } else { 0.2 }).unwrap()
    }

    fn iteration(index: usize, status: IterationStatus) -> Iteration {
        let model = ModelInfo::training(format!("m{index}"), ModelType::new("fake"), ModelMetadata::default());
        let mut it = Iteration::new(index, model);
        it.status = status;
        it
    }

    #[test]
    fn positive_fraction_of_empty_corpus_is_zero() {
        assert_eq!(positive_fraction(&[]), 0.0);
    }

    #[test]
    fn positive_fraction_counts_positives() {
        let predictions = [pred(true), pred(false), pred(true), pred(false)];
        assert_eq!(positive_fraction(&predictions), 0.5);
    }

    #[test]
    fn all_negative_corpus_has_zero_positive_fraction() {
        let predictions = vec![pred(false); 7];
        assert_eq!(positive_fraction(&predictions), 0.0);
    }

    #[test]
    fn identical_runs_have_zero_changed_fraction() {
        let run = [pred(true), pred(false), pred(true)];
        assert_eq!(changed_fraction(&run, &run), Some(0.0));
    }

    #[test]
    fn changed_fraction_counts_flips() {
        let before = [pred(true), pred(false), pred(true), pred(true)];
        let after = [pred(false), pred(false), pred(true), pred(false)];
        assert_eq!(changed_fraction(&before, &after), Some(0.5));
    }

    #[test]
    fn mismatched_runs_have_no_changed_fraction() {
        assert_eq!(changed_fraction(&[pred(true)], &[]), None);
    }

    #[test]
    fn previous_ready_skips_failed_and_later_iterations() {
        let iterations = vec![
            iteration(0, IterationStatus::Ready),
            iteration(1, IterationStatus::Error),
            iteration(2, IterationStatus::Ready),
            iteration(3, IterationStatus::Training),
            iteration(4, IterationStatus::Ready),
        ];
        assert_eq!(previous_ready(&iterations, 4).map(|it| it.index), Some(2));
        assert_eq!(previous_ready(&iterations, 2).map(|it| it.index), Some(0));
        assert_eq!(previous_ready(&iterations, 0), None);
    }

    #[test]
    fn failed_first_iteration_is_not_a_baseline() {
        let iterations = vec![iteration(0, IterationStatus::Error), iteration(1, IterationStatus::Training)];
        assert!(previous_ready(&iterations, 1).is_none());
    }

    #[test]
    fn precision_of_empty_sample_is_undefined() {
        assert_eq!(precision(0, 0), None);
        assert_eq!(precision(3, 4), Some(0.75));
    }

    #[test]
    fn progress_is_zero_without_positives() {
        assert_eq!(progress(0, 100, 20, 20), 0);
    }

    #[test]
    fn progress_takes_the_lagging_criterion() {
        assert_eq!(progress(10, 5, 20, 20), 25);
        assert_eq!(progress(30, 40, 20, 20), 100);
        assert_eq!(progress(5, 20, 10, 0), 50);
    }

    proptest! {
        #[test]
        fn positive_fraction_is_a_ratio(labels in proptest::collection::vec(any::<bool>(), 0..200)) {
            let predictions: Vec<Prediction> = labels.iter().map(|&l| pred(l)).collect();
            let fraction = positive_fraction(&predictions);
            prop_assert!((0.0..=1.0).contains(&fraction));
        }

        #[test]
        fn changed_fraction_is_a_ratio(pairs in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..200)) {
            let before: Vec<Prediction> = pairs.iter().map(|&(a, _)| pred(a)).collect();
            let after: Vec<Prediction> = pairs.iter().map(|&(_, b)| pred(b)).collect();
            let fraction = changed_fraction(&before, &after).unwrap();
            prop_assert!((0.0..=1.0).contains(&fraction));
        }

        #[test]
        fn progress_stays_in_percent_range(
            positives in 0usize..500,
            changes in 0u64..500,
            positive_threshold in 0usize..100,
            change_threshold in 0u64..100,
        ) {
            prop_assert!(progress(positives, changes, positive_threshold, change_threshold) <= 100);
        }
    }
}
