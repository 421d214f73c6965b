//! Document ingestion and the background catch-up inference it queues.

mod common;

use std::time::Duration;

use common::{eventually, test_config, Harness, WORKSPACE};
use sift_core::models::{IterationStatus, TextElement};
use sift_core::traits::ILabelStore;
use test_fixtures::Corpus;

fn element(h: &Harness, id: &str) -> TextElement {
    h.labels
        .elements_by_ids(WORKSPACE, &h.corpus.dataset, &[id.to_string()])
        .unwrap()
        .remove(0)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn new_documents_are_inferred_in_the_background() {
    let h = Harness::new();
    h.label_gold(10, 10);
    assert_eq!(h.run_iteration().await.1, IterationStatus::Ready);
    let before = h.provider.inferred_elements();

    let late = Corpus::load("late_arrivals");
    let report = h.orchestrator.add_documents(&late.dataset, &late.documents()).unwrap();
    assert_eq!(report.statistics.documents_added, 1);
    assert_eq!(report.statistics.elements_added, 3);
    assert_eq!(report.workspaces, vec![WORKSPACE.to_string()]);
    assert_eq!(report.catch_up_jobs, 1);

    eventually("catch-up completion", || h.orchestrator.metrics().catch_up_completed == 1).await;
    // late0-2 repeats a text the model already scored.
    assert_eq!(h.provider.inferred_elements(), before + 2);

    let all = h.labels.all_elements(WORKSPACE, &h.corpus.dataset).unwrap();
    let before = h.provider.inferred_elements();
    h.orchestrator.infer(WORKSPACE, h.category(), &all, None).unwrap();
    assert_eq!(h.provider.inferred_elements(), before, "catch-up warmed the cache");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn labels_reach_new_duplicates() {
    let h = Harness::new();
    h.label_gold(10, 10);
    let late = Corpus::load("late_arrivals");
    h.orchestrator.add_documents(&late.dataset, &late.documents()).unwrap();

    let duplicate = element(&h, "late0-2");
    assert!(duplicate.label_for(h.category()).is_some_and(|label| label.positive));
    assert!(element(&h, "late0-0").label_for(h.category()).is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_labeling_can_be_disabled() {
    let mut config = test_config();
    config.training.apply_labels_to_duplicate_texts = false;
    let h = Harness::with_config(config);
    h.label_gold(10, 10);
    let late = Corpus::load("late_arrivals");
    h.orchestrator.add_documents(&late.dataset, &late.documents()).unwrap();

    assert!(element(&h, "late0-2").label_for(h.category()).is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn catch_up_waits_for_the_running_iteration() {
    let h = Harness::new();
    h.label_gold(10, 10);
    h.provider.hold_training();
    h.start();

    let late = Corpus::load("late_arrivals");
    let report = h.orchestrator.add_documents(&late.dataset, &late.documents()).unwrap();
    assert_eq!(report.catch_up_jobs, 1);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(h.orchestrator.metrics().catch_up_completed, 0);

    h.provider.release_training();
    assert_eq!(h.wait(0).await, IterationStatus::Ready);
    eventually("catch-up completion", || h.orchestrator.metrics().catch_up_completed == 1).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn catch_up_is_dropped_when_the_iteration_fails() {
    let h = Harness::new();
    h.label_gold(10, 10);
    h.provider.fail_next_training();
    assert_eq!(h.run_iteration().await.1, IterationStatus::Error);

    let late = Corpus::load("late_arrivals");
    let report = h.orchestrator.add_documents(&late.dataset, &late.documents()).unwrap();
    assert_eq!(report.catch_up_jobs, 1);

    eventually("catch-up abort", || h.orchestrator.metrics().catch_up_aborted == 1).await;
    assert_eq!(h.orchestrator.metrics().catch_up_completed, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn catch_up_gives_up_after_the_timeout() {
    let mut config = test_config();
    config.jobs.catch_up_timeout_ms = 100;
    let h = Harness::with_config(config);
    h.label_gold(10, 10);
    h.provider.hold_training();
    h.start();

    let late = Corpus::load("late_arrivals");
    h.orchestrator.add_documents(&late.dataset, &late.documents()).unwrap();
    eventually("catch-up timeout", || h.orchestrator.metrics().catch_up_timed_out == 1).await;

    h.provider.release_training();
    assert_eq!(h.wait(0).await, IterationStatus::Ready);
    assert_eq!(h.orchestrator.metrics().catch_up_completed, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn nothing_is_queued_without_iterations() {
    let h = Harness::new();
    let late = Corpus::load("late_arrivals");
    let report = h.orchestrator.add_documents(&late.dataset, &late.documents()).unwrap();
    assert_eq!(report.workspaces, vec![WORKSPACE.to_string()]);
    assert_eq!(report.catch_up_jobs, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn other_datasets_leave_workspaces_alone() {
    let h = Harness::new();
    h.label_gold(10, 10);
    h.run_iteration().await;

    let late = Corpus::load("late_arrivals");
    let report = h.orchestrator.add_documents("weather_reports", &late.documents()).unwrap();
    assert!(report.workspaces.is_empty());
    assert_eq!(report.catch_up_jobs, 0);
    assert_eq!(
        h.orchestrator.list_datasets().unwrap(),
        vec!["sports_news".to_string(), "weather_reports".to_string()]
    );
}
