//! Retraining trigger: thresholds, in-flight suppression, model policy.

mod common;

use std::sync::Arc;

use common::{test_config, Harness, MODEL_TYPE, WORKSPACE};
use sift_core::errors::SiftResult;
use sift_core::models::{IterationStatus, LabelAssignments, TrainingExample};
use sift_core::traits::{ILabelStore, ITrainingSetSelector};
use sift_orchestrator::{AllLabeledSelector, Collaborators, Orchestrator};
use sift_storage::StorageEngine;
use test_fixtures::{FakeModelProvider, FixedOrderLearner, InMemoryLabelStore};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fires_once_both_thresholds_are_met() {
    let h = Harness::new();
    let cat = h.category().to_string();

    h.label(&h.corpus.gold_labels(false, 4));
    assert_eq!(h.orchestrator.train_if_recommended(WORKSPACE, &cat, false), None);

    let nine = h.corpus.gold_labels(true, 9);
    h.label(&nine);
    assert_eq!(h.change_count(), 13);
    assert_eq!(h.orchestrator.train_if_recommended(WORKSPACE, &cat, false), None);
    assert_eq!(h.iteration_count(), 0);

    let tenth: LabelAssignments = h
        .corpus
        .gold_labels(true, 10)
        .into_iter()
        .filter(|(id, _)| !nine.contains_key(id))
        .collect();
    assert_eq!(tenth.len(), 1);
    h.label(&tenth);

    let model_id = h.orchestrator.train_if_recommended(WORKSPACE, &cat, false);
    assert_eq!(model_id.as_deref(), Some("fake-0"));
    assert_eq!(h.change_count(), 0, "claiming a training run resets the counter");
    assert_eq!(h.iteration_count(), 1);
    assert_eq!(h.wait(0).await, IterationStatus::Ready);

    let snapshot = h.orchestrator.metrics();
    assert_eq!(snapshot.trigger_fired, 1);
    assert_eq!(snapshot.trigger_suppressed, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn change_threshold_applies_after_the_first_model() {
    let h = Harness::new();
    let cat = h.category().to_string();
    h.label_gold(10, 4);
    assert!(h.orchestrator.train_if_recommended(WORKSPACE, &cat, false).is_some());
    h.wait(0).await;

    // Enough positives, but only 4 changes since the last model.
    h.label(&h.corpus.gold_labels(false, 4));
    assert_eq!(h.change_count(), 4);
    assert_eq!(h.orchestrator.train_if_recommended(WORKSPACE, &cat, false), None);

    h.label(&h.corpus.gold_labels(true, 1));
    assert_eq!(
        h.orchestrator.train_if_recommended(WORKSPACE, &cat, false).as_deref(),
        Some("fake-1")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn never_starts_while_an_iteration_is_in_flight() {
    let h = Harness::new();
    let cat = h.category().to_string();
    h.label_gold(10, 4);
    h.provider.hold_training();

    assert!(h.orchestrator.train_if_recommended(WORKSPACE, &cat, false).is_some());
    h.label_gold(16, 14);
    assert_eq!(h.orchestrator.train_if_recommended(WORKSPACE, &cat, false), None);
    assert_eq!(h.orchestrator.train_if_recommended(WORKSPACE, &cat, true), None);
    assert_eq!(h.iteration_count(), 1);
    assert_eq!(h.change_count(), 30, "a suppressed trigger keeps the counter");

    h.provider.release_training();
    assert_eq!(h.wait(0).await, IterationStatus::Ready);
    assert_eq!(
        h.orchestrator.train_if_recommended(WORKSPACE, &cat, false).as_deref(),
        Some("fake-1")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_triggers_start_a_single_iteration() {
    let h = Harness::new();
    let cat = h.category().to_string();
    h.label_gold(10, 10);
    h.provider.hold_training();

    let started: Vec<Option<String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let orchestrator = h.orchestrator.clone();
                let cat = cat.clone();
                scope.spawn(move || orchestrator.train_if_recommended(WORKSPACE, &cat, true))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });
    assert_eq!(started.iter().flatten().count(), 1);
    assert_eq!(h.iteration_count(), 1);

    h.provider.release_training();
    assert_eq!(h.wait(0).await, IterationStatus::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn force_ignores_thresholds() {
    let h = Harness::new();
    let cat = h.category().to_string();
    h.label_gold(1, 1);

    assert_eq!(
        h.orchestrator.train_if_recommended(WORKSPACE, &cat, true).as_deref(),
        Some("fake-0")
    );
    assert_eq!(h.wait(0).await, IterationStatus::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_iterations_do_not_block_the_next_one() {
    let h = Harness::new();
    let cat = h.category().to_string();
    h.label_gold(10, 10);
    h.provider.fail_next_training();

    assert!(h.orchestrator.train_if_recommended(WORKSPACE, &cat, true).is_some());
    assert_eq!(h.wait(0).await, IterationStatus::Error);

    assert_eq!(
        h.orchestrator.train_if_recommended(WORKSPACE, &cat, true).as_deref(),
        Some("fake-1")
    );
    assert_eq!(h.wait(1).await, IterationStatus::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn errors_are_logged_not_returned() {
    let h = Harness::new();
    assert_eq!(h.orchestrator.train_if_recommended("nowhere", h.category(), true), None);
    assert_eq!(h.orchestrator.train_if_recommended(WORKSPACE, "weather", true), None);
    assert_eq!(h.orchestrator.metrics().trigger_fired, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn progress_is_the_lagging_threshold() {
    let h = Harness::new();
    let cat = h.category().to_string();
    assert_eq!(h.orchestrator.progress(WORKSPACE, &cat).unwrap(), 0);

    h.label(&h.corpus.gold_labels(false, 4));
    assert_eq!(h.orchestrator.progress(WORKSPACE, &cat).unwrap(), 0, "no positives yet");

    h.label(&h.corpus.gold_labels(true, 5));
    assert_eq!(h.orchestrator.progress(WORKSPACE, &cat).unwrap(), 50);

    h.label(&h.corpus.gold_labels(true, 12));
    assert_eq!(h.orchestrator.progress(WORKSPACE, &cat).unwrap(), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn model_policy_switches_after_the_first_iteration() {
    let mut config = test_config();
    config.training.model_policy.switch_to = Some("fake-large".to_string());
    config.training.model_policy.switch_after = 1;
    let h = Harness::with_providers(
        config,
        vec![
            Arc::new(FakeModelProvider::new(MODEL_TYPE)),
            Arc::new(FakeModelProvider::new("fake-large")),
        ],
    );
    let cat = h.category().to_string();
    h.label_gold(10, 10);

    assert_eq!(
        h.orchestrator.train_if_recommended(WORKSPACE, &cat, true).as_deref(),
        Some("fake-0")
    );
    h.wait(0).await;
    assert_eq!(
        h.orchestrator.train_if_recommended(WORKSPACE, &cat, true).as_deref(),
        Some("fake-large-0")
    );
    assert_eq!(h.wait(1).await, IterationStatus::Ready);
}

/// Trains on positives only.
struct PositivesOnly;

impl ITrainingSetSelector for PositivesOnly {
    fn training_set(
        &self,
        labels: &dyn ILabelStore,
        workspace_id: &str,
        dataset_name: &str,
        category: &str,
    ) -> SiftResult<Vec<TrainingExample>> {
        Ok(AllLabeledSelector
            .training_set(labels, workspace_id, dataset_name, category)?
            .into_iter()
            .filter(|example| example.label.positive)
            .collect())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn trigger_trains_on_the_configured_selector() {
    let corpus = test_fixtures::Corpus::load("sports_news");
    let labels = Arc::new(InMemoryLabelStore::new());
    labels.add_documents(&corpus.dataset, &corpus.documents()).unwrap();
    let config = test_config();
    let mut models = sift_models::ModelRegistry::with_cache(&config.inference_cache);
    models.register(Arc::new(FakeModelProvider::new(MODEL_TYPE)));

    let collaborators = Collaborators::new(
        Arc::new(StorageEngine::open_in_memory().unwrap()),
        labels,
        models,
        Arc::new(FixedOrderLearner::new()),
    )
    .with_selector(Arc::new(PositivesOnly));
    let orchestrator = Orchestrator::new(config, collaborators, tokio::runtime::Handle::current()).unwrap();
    orchestrator.create_workspace(WORKSPACE, &corpus.dataset).unwrap();
    orchestrator.create_category(WORKSPACE, &corpus.category, "").unwrap();
    orchestrator
        .set_labels(WORKSPACE, &corpus.gold_labels(true, 10), false, true)
        .unwrap();
    orchestrator
        .set_labels(WORKSPACE, &corpus.gold_labels(false, 10), false, true)
        .unwrap();

    assert!(orchestrator
        .train_if_recommended(WORKSPACE, &corpus.category, false)
        .is_some());
    let counts = &orchestrator.iterations(WORKSPACE, &corpus.category).unwrap()[0]
        .model
        .metadata
        .train_counts;
    assert_eq!(counts.get("true"), Some(&10));
    assert_eq!(counts.get("false"), None);
}
