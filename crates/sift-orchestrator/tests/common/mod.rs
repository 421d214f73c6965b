//! Shared setup for orchestrator integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;

use sift_core::config::SiftConfig;
use sift_core::models::{IterationStatus, LabelAssignments, ModelType, TrainParams};
use sift_core::traits::{ILabelStore, IStateStore, ITrainingSetSelector};
use sift_models::ModelRegistry;
use sift_orchestrator::{AllLabeledSelector, Collaborators, Orchestrator};
use sift_storage::StorageEngine;
use test_fixtures::{Corpus, FakeModelProvider, FixedOrderLearner, InMemoryLabelStore};

pub const WORKSPACE: &str = "newsroom";
pub const MODEL_TYPE: &str = "fake";
pub const WAIT: Duration = Duration::from_secs(10);

/// Trigger thresholds: 10 positives, 5 changes. Catch-up polls quickly.
pub fn test_config() -> SiftConfig {
    let mut config = SiftConfig::default();
    config.training.model_policy.initial = MODEL_TYPE.to_string();
    config.training.first_model_positive_threshold = 10;
    config.training.changed_element_threshold = 5;
    config.jobs.catch_up_poll_interval_ms = 20;
    config.jobs.catch_up_timeout_ms = 10_000;
    config
}

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub store: Arc<StorageEngine>,
    pub labels: Arc<InMemoryLabelStore>,
    pub provider: Arc<FakeModelProvider>,
    pub learner: Arc<FixedOrderLearner>,
    pub corpus: Corpus,
}

impl Harness {
    /// Must run inside a tokio runtime.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: SiftConfig) -> Self {
        Self::with_providers(config, vec![Arc::new(FakeModelProvider::new(MODEL_TYPE))])
    }

    /// The first provider is the one exposed as `provider`.
    pub fn with_providers(config: SiftConfig, providers: Vec<Arc<FakeModelProvider>>) -> Self {
        let corpus = Corpus::load("sports_news");
        let labels = Arc::new(InMemoryLabelStore::new());
        labels.add_documents(&corpus.dataset, &corpus.documents()).unwrap();

        let mut models = ModelRegistry::with_cache(&config.inference_cache);
        for provider in &providers {
            models.register(provider.clone());
        }
        let learner = Arc::new(FixedOrderLearner::new());
        let store = Arc::new(StorageEngine::open_in_memory().unwrap());

        let orchestrator = Orchestrator::new(
            config,
            Collaborators::new(store.clone(), labels.clone(), models, learner.clone()),
            Handle::current(),
        )
        .unwrap();
        orchestrator.create_workspace(WORKSPACE, &corpus.dataset).unwrap();
        orchestrator
            .create_category(WORKSPACE, &corpus.category, "Sport coverage")
            .unwrap();

        Self {
            orchestrator,
            store,
            labels,
            provider: providers[0].clone(),
            learner,
            corpus,
        }
    }

    pub fn category(&self) -> &str {
        &self.corpus.category
    }

    /// Label without touching duplicates, counting towards the trigger.
    pub fn label(&self, assignments: &LabelAssignments) {
        self.orchestrator
            .set_labels(WORKSPACE, assignments, false, true)
            .unwrap();
    }

    pub fn label_gold(&self, positives: usize, negatives: usize) {
        self.label(&self.corpus.gold_labels(true, positives));
        self.label(&self.corpus.gold_labels(false, negatives));
    }

    pub fn change_count(&self) -> u64 {
        self.store.label_change_count(WORKSPACE, self.category()).unwrap()
    }

    /// Start an iteration on every labeled element and return its model id.
    pub fn start(&self) -> String {
        let train_data = AllLabeledSelector
            .training_set(self.labels.as_ref(), WORKSPACE, &self.corpus.dataset, self.category())
            .unwrap();
        self.orchestrator
            .start_iteration(
                WORKSPACE,
                self.category(),
                &ModelType::new(MODEL_TYPE),
                train_data,
                TrainParams::new(),
            )
            .unwrap()
    }

    pub async fn wait(&self, iteration: usize) -> IterationStatus {
        self.orchestrator
            .wait_for_iteration(WORKSPACE, self.category(), iteration, WAIT)
            .await
            .unwrap()
    }

    /// Start an iteration, wait for it to settle, and return its index.
    pub async fn run_iteration(&self) -> (usize, IterationStatus) {
        self.start();
        let index = self.iteration_count() - 1;
        (index, self.wait(index).await)
    }

    pub fn iteration_count(&self) -> usize {
        self.orchestrator
            .iterations(WORKSPACE, self.category())
            .unwrap()
            .len()
    }
}

/// Poll `condition` until it holds, panicking after [`WAIT`].
pub async fn eventually(what: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + WAIT;
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
