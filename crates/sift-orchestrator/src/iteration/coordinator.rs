//! One task per iteration: submit each phase's job to the pool, consume
//! its completion event, persist the outcome, decide the next step.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;

use sift_core::constants::stats;
use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::{IterationStatus, ModelStatus, Prediction, TextElement, TrainParams, TrainingExample};
use sift_core::traits::{IModelProvider, RecommendationRequest};
use sift_observability::tracing_setup::events;

use crate::engine::Shared;
use crate::iteration::state_machine::{Completion, IterationMachine, NextJob, Transition};
use crate::{retention, statistics};

/// Identity of the iteration a coordinator drives.
#[derive(Debug, Clone)]
pub(crate) struct IterationKey {
    pub(crate) workspace_id: String,
    pub(crate) category: String,
    pub(crate) dataset_name: String,
    pub(crate) index: usize,
    pub(crate) model_id: String,
}

impl IterationKey {
    /// A failed recovery write can leave the iteration in flight for good,
    /// which blocks the trigger for this category.
    fn log_recovery_failure(&self, step: &str, err: &SiftError) {
        tracing::error!(
            workspace = %self.workspace_id,
            category = %self.category,
            iteration = self.index,
            model_id = %self.model_id,
            step,
            error = %err,
            "could not record iteration failure"
        );
    }
}

/// The whole corpus with the new model's prediction for each element.
pub(crate) struct CorpusPredictions {
    elements: Vec<TextElement>,
    predictions: Vec<Prediction>,
}

/// Completion events, one per job kind.
pub(crate) enum PhaseEvent {
    Trained(SiftResult<()>),
    Inferred(SiftResult<CorpusPredictions>),
    StatisticsComputed(SiftResult<BTreeMap<String, f64>>),
    Recommended(SiftResult<Vec<String>>),
}

pub(crate) struct IterationCoordinator {
    shared: Arc<Shared>,
    key: Arc<IterationKey>,
    provider: Arc<dyn IModelProvider>,
    machine: IterationMachine,
    corpus: Option<Arc<CorpusPredictions>>,
    recommendations: usize,
    events_tx: mpsc::UnboundedSender<PhaseEvent>,
    events_rx: mpsc::UnboundedReceiver<PhaseEvent>,
}

impl IterationCoordinator {
    pub(crate) fn new(shared: Arc<Shared>, key: IterationKey, provider: Arc<dyn IModelProvider>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            shared,
            key: Arc::new(key),
            provider,
            machine: IterationMachine::new(),
            corpus: None,
            recommendations: 0,
            events_tx,
            events_rx,
        }
    }

    pub(crate) async fn run(self, examples: Vec<TrainingExample>, params: TrainParams) {
        let span = sift_observability::iteration_span!(self.key.workspace_id, self.key.category, self.key.index);
        self.drive(examples, params).instrument(span).await
    }

    async fn drive(mut self, examples: Vec<TrainingExample>, params: TrainParams) {
        self.submit_training(examples, params);
        while let Some(event) = self.events_rx.recv().await {
            self.on_event(event).await;
            if self.machine.is_finished() {
                break;
            }
        }
        tracing::debug!(phase = ?self.machine.phase(), "coordinator done");
    }

    async fn on_event(&mut self, event: PhaseEvent) {
        let (completion, outcome) = match event {
            PhaseEvent::Trained(result) => (Completion::Trained, result),
            PhaseEvent::Inferred(result) => (
                Completion::Inferred,
                result.map(|corpus| self.corpus = Some(Arc::new(corpus))),
            ),
            PhaseEvent::StatisticsComputed(result) => (
                Completion::StatisticsComputed,
                result.and_then(|statistics| self.record_statistics(&statistics)),
            ),
            PhaseEvent::Recommended(result) => (
                Completion::Recommended,
                result.and_then(|ids| self.record_recommendations(&ids)),
            ),
        };

        let key = &self.key;
        match &outcome {
            Ok(()) if completion == Completion::Trained => {
                events::training_completed(&key.workspace_id, &key.category, key.index, &key.model_id);
            }
            Ok(()) => {}
            Err(err) => {
                events::iteration_failed(&key.workspace_id, &key.category, key.index, completion.as_str(), &err.to_string());
            }
        }

        match self.machine.advance(completion, outcome.is_ok()) {
            Ok(transition) => self.apply(transition).await,
            Err(unexpected) => tracing::error!(error = %unexpected, "ignoring completion"),
        }
    }

    async fn apply(&mut self, transition: Transition) {
        if let Err(err) = self.write_statuses(&transition) {
            let key = &self.key;
            events::iteration_failed(&key.workspace_id, &key.category, key.index, "persist", &err.to_string());
            self.abandon();
            return;
        }

        match transition.iteration_status {
            Some(IterationStatus::Ready) => {
                self.shared.metrics.record_iteration_ready();
                events::iteration_finished(&self.key.workspace_id, &self.key.category, self.key.index, self.recommendations);
            }
            Some(IterationStatus::Error) => self.shared.metrics.record_iteration_failed(),
            _ => {}
        }

        if let Some(job) = transition.next_job {
            self.submit(job);
        }
        if transition.sweep {
            self.sweep().await;
        }
    }

    fn write_statuses(&self, transition: &Transition) -> SiftResult<()> {
        let key = &self.key;
        if let Some(model_status) = transition.model_status {
            self.shared
                .store
                .set_model_status(&key.workspace_id, &key.category, key.index, model_status)?;
        }
        if let Some(status) = transition.iteration_status {
            self.shared
                .store
                .set_iteration_status(&key.workspace_id, &key.category, key.index, status)?;
        }
        Ok(())
    }

    /// Stop driving after the store refused a write. Marks what it still
    /// can as ERROR; the store may be what failed.
    fn abandon(&mut self) {
        let _ = self.machine.fail_current();
        self.shared.metrics.record_iteration_failed();

        let key = &self.key;
        let store = &self.shared.store;
        let iteration = match store.get_iteration(&key.workspace_id, &key.category, key.index) {
            Ok(iteration) => iteration,
            Err(err) => {
                key.log_recovery_failure("read iteration", &err);
                return;
            }
        };
        if iteration.model.model_status == ModelStatus::Training {
            if let Err(err) = store.set_model_status(&key.workspace_id, &key.category, key.index, ModelStatus::Error) {
                key.log_recovery_failure("mark model ERROR", &err);
            }
        }
        if !iteration.status.is_terminal() {
            if let Err(err) =
                store.set_iteration_status(&key.workspace_id, &key.category, key.index, IterationStatus::Error)
            {
                key.log_recovery_failure("mark iteration ERROR", &err);
            }
        }
    }

    fn record_statistics(&self, statistics: &BTreeMap<String, f64>) -> SiftResult<()> {
        let key = &self.key;
        self.shared
            .store
            .add_iteration_statistics(&key.workspace_id, &key.category, key.index, statistics)?;
        events::statistics_recorded(&key.workspace_id, &key.category, key.index, statistics);
        Ok(())
    }

    fn record_recommendations(&mut self, ids: &[String]) -> SiftResult<()> {
        let key = &self.key;
        self.shared
            .store
            .set_recommendations(&key.workspace_id, &key.category, key.index, ids)?;
        self.recommendations = ids.len();
        Ok(())
    }

    fn submit_training(&self, examples: Vec<TrainingExample>, params: TrainParams) {
        let provider = Arc::clone(&self.provider);
        let key = Arc::clone(&self.key);
        self.shared.pool.submit(
            move || {
                provider
                    .train(&key.model_id, &examples, &params)
                    .map_err(SiftError::from)
            },
            PhaseEvent::Trained,
            self.events_tx.clone(),
        );
    }

    fn submit(&self, job: NextJob) {
        let shared = Arc::clone(&self.shared);
        let provider = Arc::clone(&self.provider);
        let key = Arc::clone(&self.key);
        let events = self.events_tx.clone();
        match job {
            NextJob::Infer => self.shared.pool.submit(
                move || infer_corpus(&shared, provider.as_ref(), &key),
                PhaseEvent::Inferred,
                events,
            ),
            NextJob::ComputeStatistics => match self.corpus.clone() {
                Some(corpus) => self.shared.pool.submit(
                    move || compute_statistics(&shared, &key, &corpus),
                    PhaseEvent::StatisticsComputed,
                    events,
                ),
                None => {
                    let _ = events.send(PhaseEvent::StatisticsComputed(Err(SiftError::JobFailed {
                        reason: "corpus predictions missing".to_string(),
                    })));
                }
            },
            NextJob::Recommend => self.shared.pool.submit(
                move || recommend(&shared, provider.as_ref(), &key),
                PhaseEvent::Recommended,
                events,
            ),
        }
    }

    /// Retention runs after every finished iteration; failures are only logged.
    async fn sweep(&self) {
        let shared = Arc::clone(&self.shared);
        let key = Arc::clone(&self.key);
        let result = self
            .shared
            .pool
            .run(move || retention::sweep_old_models(&shared, &key.workspace_id, &key.category, key.index))
            .await;
        match result {
            Ok(deleted) if !deleted.is_empty() => {
                tracing::info!(deleted = ?deleted, "retention sweep done");
            }
            Ok(_) => {}
            Err(err) => {
                self.shared.metrics.record_retention_failure();
                tracing::warn!(error = %err, "retention sweep failed");
            }
        }
    }
}

fn infer_corpus(shared: &Shared, provider: &dyn IModelProvider, key: &IterationKey) -> SiftResult<CorpusPredictions> {
    let elements = shared.labels.all_elements(&key.workspace_id, &key.dataset_name)?;
    let predictions = provider.infer(&key.model_id, &elements, true)?;
    Ok(CorpusPredictions { elements, predictions })
}

/// `positive_fraction` always; `changed_fraction` against the most recent
/// earlier READY iteration whose model is still available.
fn compute_statistics(
    shared: &Shared,
    key: &IterationKey,
    corpus: &CorpusPredictions,
) -> SiftResult<BTreeMap<String, f64>> {
    let mut computed = BTreeMap::new();
    computed.insert(
        stats::POSITIVE_FRACTION.to_string(),
        statistics::positive_fraction(&corpus.predictions),
    );

    let iterations = shared.store.get_iterations(&key.workspace_id, &key.category)?;
    if let Some(previous) = statistics::previous_ready(&iterations, key.index) {
        if previous.model.model_status == ModelStatus::Ready {
            let provider = shared.models.get(&previous.model.model_type)?;
            let before = provider.infer(&previous.model.model_id, &corpus.elements, true)?;
            if let Some(changed) = statistics::changed_fraction(&before, &corpus.predictions) {
                computed.insert(stats::CHANGED_FRACTION.to_string(), changed);
            }
        } else {
            tracing::warn!(
                previous = previous.index,
                model_status = %previous.model.model_status,
                "previous model unavailable, skipping {}",
                stats::CHANGED_FRACTION
            );
        }
    }
    Ok(computed)
}

fn recommend(shared: &Shared, provider: &dyn IModelProvider, key: &IterationKey) -> SiftResult<Vec<String>> {
    let candidates = shared
        .labels
        .unlabeled_elements(&key.workspace_id, &key.dataset_name, &key.category)?;
    let predictions = provider.infer(&key.model_id, &candidates, true)?;
    shared.learner.recommend(&RecommendationRequest {
        workspace_id: &key.workspace_id,
        dataset_name: &key.dataset_name,
        category: &key.category,
        candidates: &candidates,
        predictions: &predictions,
        sample_size: shared.config.active_learning.suggestion_count,
    })
}
