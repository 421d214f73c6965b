//! State store behavior against the in-memory engine.

use std::collections::BTreeMap;

use sift_core::errors::SiftError;
use sift_core::models::*;
use sift_core::traits::IStateStore;
use sift_storage::StorageEngine;

fn model(id: &str) -> ModelInfo {
    ModelInfo::training(id, ModelType::new("svm_ensemble"), ModelMetadata::default())
}

fn store_with_category() -> StorageEngine {
    let store = StorageEngine::open_in_memory().unwrap();
    store.create_workspace("ws", "news").unwrap();
    store.add_category("ws", "sports", "about sports").unwrap();
    store
}

/// Walk an iteration through the whole lifecycle.
fn finish(store: &StorageEngine, index: usize) {
    store.set_model_status("ws", "sports", index, ModelStatus::Ready).unwrap();
    store
        .set_iteration_status("ws", "sports", index, IterationStatus::RunningInference)
        .unwrap();
    store
        .set_iteration_status("ws", "sports", index, IterationStatus::RunningActiveLearning)
        .unwrap();
    store
        .set_iteration_status("ws", "sports", index, IterationStatus::Ready)
        .unwrap();
}

#[test]
fn duplicate_workspace_is_rejected() {
    let store = store_with_category();
    let err = store.create_workspace("ws", "news").unwrap_err();
    assert!(matches!(err, SiftError::WorkspaceExists { .. }));
}

#[test]
fn unknown_category_error_names_workspace_and_category() {
    let store = store_with_category();
    let err = store.get_category("ws", "politics").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("ws") && msg.contains("politics"), "{msg}");

    let err = store.get_category("nope", "sports").unwrap_err();
    assert!(matches!(err, SiftError::WorkspaceNotFound { .. }));
}

#[test]
fn iterations_get_contiguous_indices() {
    let store = store_with_category();
    for i in 0..4 {
        let index = store.append_iteration("ws", "sports", &model(&format!("m{i}"))).unwrap();
        assert_eq!(index, i);
    }
    let indices: Vec<usize> = store
        .get_iterations("ws", "sports")
        .unwrap()
        .iter()
        .map(|it| it.index)
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn new_iteration_starts_training() {
    let store = store_with_category();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    let it = store.get_iteration("ws", "sports", 0).unwrap();
    assert_eq!(it.status, IterationStatus::Training);
    assert_eq!(it.model.model_status, ModelStatus::Training);
    assert_eq!(it.model.model_id, "m0");
}

#[test]
fn skipping_a_lifecycle_step_is_rejected() {
    let store = store_with_category();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    let err = store
        .set_iteration_status("ws", "sports", 0, IterationStatus::Ready)
        .unwrap_err();
    assert!(matches!(
        err,
        SiftError::InvalidTransition {
            from: IterationStatus::Training,
            to: IterationStatus::Ready,
            ..
        }
    ));
}

#[test]
fn ready_requires_a_ready_model() {
    let store = store_with_category();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    store
        .set_iteration_status("ws", "sports", 0, IterationStatus::RunningInference)
        .unwrap();
    store
        .set_iteration_status("ws", "sports", 0, IterationStatus::RunningActiveLearning)
        .unwrap();
    let err = store
        .set_iteration_status("ws", "sports", 0, IterationStatus::Ready)
        .unwrap_err();
    assert!(matches!(err, SiftError::ModelNotReady { .. }));
}

#[test]
fn terminal_iteration_cannot_fail_afterwards() {
    let store = store_with_category();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    finish(&store, 0);
    let err = store
        .set_iteration_status("ws", "sports", 0, IterationStatus::Error)
        .unwrap_err();
    assert!(matches!(err, SiftError::InvalidTransition { .. }));
}

#[test]
fn deleting_a_deleted_model_fails_loudly() {
    let store = store_with_category();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    finish(&store, 0);

    let before = store.mark_model_deleted("ws", "sports", 0).unwrap();
    assert_eq!(before.model_status, ModelStatus::Ready);
    let it = store.get_iteration("ws", "sports", 0).unwrap();
    assert_eq!(it.model.model_status, ModelStatus::Deleted);
    // The iteration record survives artifact deletion.
    assert_eq!(it.status, IterationStatus::Ready);

    let err = store.mark_model_deleted("ws", "sports", 0).unwrap_err();
    match err {
        SiftError::ModelAlreadyDeleted { model_id, iteration, .. } => {
            assert_eq!(model_id, "m0");
            assert_eq!(iteration, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn training_model_cannot_be_deleted() {
    let store = store_with_category();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    let err = store.mark_model_deleted("ws", "sports", 0).unwrap_err();
    assert!(matches!(err, SiftError::InvalidModelTransition { .. }));
}

#[test]
fn counter_increases_and_resets() {
    let store = store_with_category();
    assert_eq!(store.label_change_count("ws", "sports").unwrap(), 0);
    assert_eq!(store.increase_label_change_count("ws", "sports", 3).unwrap(), 3);
    assert_eq!(store.increase_label_change_count("ws", "sports", 4).unwrap(), 7);
    store.reset_label_change_count("ws", "sports").unwrap();
    assert_eq!(store.label_change_count("ws", "sports").unwrap(), 0);
}

#[test]
fn claim_training_refuses_while_in_flight() {
    let store = store_with_category();
    store.increase_label_change_count("ws", "sports", 10).unwrap();

    assert_eq!(
        store.claim_training("ws", "sports", Some(5)).unwrap(),
        TrainingClaim::Claimed { changes: 10 }
    );
    assert_eq!(store.label_change_count("ws", "sports").unwrap(), 0);

    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    store.increase_label_change_count("ws", "sports", 10).unwrap();
    let claim = store.claim_training("ws", "sports", None).unwrap();
    assert_eq!(
        claim,
        TrainingClaim::InFlight {
            iteration: 0,
            status: IterationStatus::Training
        }
    );
    // Refusal leaves the counter alone.
    assert_eq!(store.label_change_count("ws", "sports").unwrap(), 10);
}

#[test]
fn claim_training_ignores_failed_iterations_and_checks_threshold() {
    let store = store_with_category();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    store.set_model_status("ws", "sports", 0, ModelStatus::Error).unwrap();
    store
        .set_iteration_status("ws", "sports", 0, IterationStatus::Error)
        .unwrap();
    store.increase_label_change_count("ws", "sports", 2).unwrap();

    assert_eq!(
        store.claim_training("ws", "sports", Some(5)).unwrap(),
        TrainingClaim::BelowThreshold { changes: 2 }
    );
    assert!(store.claim_training("ws", "sports", None).unwrap().is_claimed());
}

#[test]
fn statistics_are_merged() {
    let store = store_with_category();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    store
        .add_iteration_statistics("ws", "sports", 0, &BTreeMap::from([("positive_fraction".to_string(), 0.4)]))
        .unwrap();
    store
        .add_iteration_statistics("ws", "sports", 0, &BTreeMap::from([("estimated_precision".to_string(), 0.9)]))
        .unwrap();
    let it = store.get_iteration("ws", "sports", 0).unwrap();
    assert_eq!(it.statistic("positive_fraction"), Some(0.4));
    assert_eq!(it.statistic("estimated_precision"), Some(0.9));
}

#[test]
fn current_recommendations_come_from_latest_ready_iteration() {
    let store = store_with_category();
    assert!(store.current_recommendations("ws", "sports").unwrap().is_empty());

    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    store
        .set_recommendations("ws", "sports", 0, &["a".to_string(), "b".to_string()])
        .unwrap();
    // Not READY yet.
    assert!(store.current_recommendations("ws", "sports").unwrap().is_empty());
    finish(&store, 0);

    store.append_iteration("ws", "sports", &model("m1")).unwrap();
    store.set_recommendations("ws", "sports", 1, &["c".to_string()]).unwrap();
    assert_eq!(
        store.current_recommendations("ws", "sports").unwrap(),
        vec!["a".to_string(), "b".to_string()]
    );
}

#[test]
fn iterations_by_status_filters() {
    let store = store_with_category();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    finish(&store, 0);
    store.append_iteration("ws", "sports", &model("m1")).unwrap();

    let ready = store
        .iterations_by_status("ws", "sports", IterationStatus::Ready)
        .unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].index, 0);
}

#[test]
fn deleting_workspace_cascades() {
    let store = store_with_category();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    store.delete_workspace("ws").unwrap();
    assert!(!store.workspace_exists("ws").unwrap());

    // Recreating starts from a clean slate.
    store.create_workspace("ws", "news").unwrap();
    store.add_category("ws", "sports", "").unwrap();
    assert!(store.get_iterations("ws", "sports").unwrap().is_empty());
}

#[test]
fn workspaces_are_listed_sorted_and_by_dataset() {
    let store = StorageEngine::open_in_memory().unwrap();
    store.create_workspace("b", "news").unwrap();
    store.create_workspace("a", "reviews").unwrap();
    store.create_workspace("c", "news").unwrap();

    assert_eq!(store.list_workspace_ids().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(store.workspaces_for_dataset("news").unwrap(), vec!["b", "c"]);
}

#[test]
fn get_workspace_includes_categories_and_iterations() {
    let store = store_with_category();
    store.add_category("ws", "weather", "").unwrap();
    store.append_iteration("ws", "sports", &model("m0")).unwrap();

    let ws = store.get_workspace("ws").unwrap();
    assert_eq!(ws.dataset_name, "news");
    assert_eq!(ws.categories.len(), 2);
    assert_eq!(ws.categories["sports"].iterations.len(), 1);
    assert_eq!(ws.categories["sports"].description, "about sports");
}

#[tokio::test]
async fn status_changes_are_broadcast() {
    let store = store_with_category();
    let mut rx = store.subscribe().expect("sqlite store publishes status changes");

    store.append_iteration("ws", "sports", &model("m0")).unwrap();
    store.set_model_status("ws", "sports", 0, ModelStatus::Ready).unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.status, IterationStatus::Training);
    let second = rx.recv().await.unwrap();
    assert_eq!(second.model_status, ModelStatus::Ready);
    assert_eq!(second.iteration, 0);
    assert_eq!(second.workspace_id, "ws");
}
