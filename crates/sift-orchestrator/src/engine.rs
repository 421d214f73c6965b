//! Orchestrator: construction, shared state, and workspace/category administration.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use sift_core::config::SiftConfig;
use sift_core::constants::VERSION;
use sift_core::errors::{ConfigError, SiftError, SiftResult};
use sift_core::models::{Category, ModelStatus};
use sift_core::traits::{IActiveLearner, ILabelStore, IStateStore, ITrainingSetSelector};
use sift_models::{ModelPolicy, ModelRegistry};
use sift_observability::{MetricsSnapshot, OrchestratorMetrics};
use sift_storage::StorageEngine;

use crate::jobs::catch_up::{self, CatchUpJob};
use crate::jobs::JobPool;
use crate::retention;
use crate::selector::AllLabeledSelector;

/// The collaborators an [`Orchestrator`] is wired against.
pub struct Collaborators {
    pub store: Arc<dyn IStateStore>,
    pub labels: Arc<dyn ILabelStore>,
    pub models: ModelRegistry,
    pub learner: Arc<dyn IActiveLearner>,
    pub selector: Arc<dyn ITrainingSetSelector>,
}

impl Collaborators {
    /// Trains on every labeled element unless a selector is set with
    /// [`with_selector`](Self::with_selector).
    pub fn new(
        store: Arc<dyn IStateStore>,
        labels: Arc<dyn ILabelStore>,
        models: ModelRegistry,
        learner: Arc<dyn IActiveLearner>,
    ) -> Self {
        Self {
            store,
            labels,
            models,
            learner,
            selector: Arc::new(AllLabeledSelector),
        }
    }

    pub fn with_selector(mut self, selector: Arc<dyn ITrainingSetSelector>) -> Self {
        self.selector = selector;
        self
    }
}

pub(crate) type CategoryKey = (String, String);

/// State shared by the public handle, iteration coordinators and the
/// catch-up worker.
pub(crate) struct Shared {
    pub(crate) store: Arc<dyn IStateStore>,
    pub(crate) labels: Arc<dyn ILabelStore>,
    pub(crate) models: ModelRegistry,
    pub(crate) learner: Arc<dyn IActiveLearner>,
    pub(crate) selector: Arc<dyn ITrainingSetSelector>,
    pub(crate) policy: ModelPolicy,
    pub(crate) config: SiftConfig,
    pub(crate) pool: JobPool,
    pub(crate) catch_up: mpsc::UnboundedSender<CatchUpJob>,
    /// Serializes trigger evaluations per (workspace, category).
    pub(crate) trigger_locks: DashMap<CategoryKey, Arc<Mutex<()>>>,
    pub(crate) metrics: OrchestratorMetrics,
}

impl Shared {
    pub(crate) fn dataset_name(&self, workspace_id: &str) -> SiftResult<String> {
        Ok(self.store.get_workspace(workspace_id)?.dataset_name)
    }

    pub(crate) fn trigger_lock(&self, workspace_id: &str, category: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.trigger_locks
                .entry((workspace_id.to_string(), category.to_string()))
                .or_default()
                .value(),
        )
    }
}

/// The active-learning control plane.
///
/// Cheap to clone. Public operations return quickly: training, inference
/// over the corpus and recommendations run on the job pool and are driven
/// by one coordinator task per iteration. [`infer`](Self::infer) is the
/// exception and blocks the caller.
#[derive(Clone)]
pub struct Orchestrator {
    pub(crate) inner: Arc<Shared>,
}

impl Orchestrator {
    /// Build an orchestrator on `runtime`. Fails when the config is invalid
    /// or the model policy names a type with no registered provider.
    pub fn new(config: SiftConfig, collaborators: Collaborators, runtime: Handle) -> SiftResult<Self> {
        config.validate()?;
        let policy = ModelPolicy::from_config(&config.training.model_policy);
        if let Some(missing) = policy
            .model_types()
            .into_iter()
            .find(|model_type| !collaborators.models.contains(model_type))
        {
            return Err(ConfigError::ValidationFailed {
                field: "training.model_policy".to_string(),
                message: format!("no provider registered for model type '{missing}'"),
            }
            .into());
        }

        let pool = JobPool::new(runtime.clone(), config.jobs.worker_count);
        let (catch_up_tx, catch_up_rx) = mpsc::unbounded_channel();
        let inner = Arc::new_cyclic(|weak| {
            runtime.spawn(catch_up::worker(weak.clone(), catch_up_rx));
            Shared {
                store: collaborators.store,
                labels: collaborators.labels,
                models: collaborators.models,
                learner: collaborators.learner,
                selector: collaborators.selector,
                policy,
                config,
                pool,
                catch_up: catch_up_tx,
                trigger_locks: DashMap::new(),
                metrics: OrchestratorMetrics::new(),
            }
        });

        tracing::info!(
            version = VERSION,
            workers = inner.config.jobs.worker_count,
            learner = inner.learner.name(),
            model_types = ?inner.models.model_types(),
            "orchestrator started"
        );
        Ok(Self { inner })
    }

    /// Like [`new`](Self::new), with the SQLite state store described by
    /// `config.storage`.
    pub fn open(
        config: SiftConfig,
        labels: Arc<dyn ILabelStore>,
        models: ModelRegistry,
        learner: Arc<dyn IActiveLearner>,
        runtime: Handle,
    ) -> SiftResult<Self> {
        let store = StorageEngine::open_with_config(
            Path::new(&config.storage.db_path),
            &config.storage,
            config.jobs.status_channel_capacity,
        )?;
        Self::new(
            config,
            Collaborators::new(Arc::new(store), labels, models, learner),
            runtime,
        )
    }

    pub fn config(&self) -> &SiftConfig {
        &self.inner.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.inner.models
    }

    // --- Workspaces ---

    /// Fails when the dataset is unknown or the workspace already exists.
    pub fn create_workspace(&self, workspace_id: &str, dataset_name: &str) -> SiftResult<()> {
        if !self.inner.labels.dataset_exists(dataset_name)? {
            return Err(SiftError::DatasetNotFound {
                dataset_name: dataset_name.to_string(),
            });
        }
        self.inner.store.create_workspace(workspace_id, dataset_name)?;
        tracing::info!(workspace = workspace_id, dataset = dataset_name, "workspace created");
        Ok(())
    }

    /// Deletes the models of every category, then the workspace state,
    /// then the workspace's labels.
    pub fn delete_workspace(&self, workspace_id: &str) -> SiftResult<()> {
        let workspace = self.inner.store.get_workspace(workspace_id)?;
        for category in workspace.categories.values() {
            self.delete_category_models(workspace_id, category)?;
        }
        self.inner.store.delete_workspace(workspace_id)?;
        self.inner
            .labels
            .delete_all_labels(workspace_id, &workspace.dataset_name)?;
        self.inner
            .trigger_locks
            .retain(|(workspace, _), _| workspace != workspace_id);
        tracing::info!(workspace = workspace_id, "workspace deleted");
        Ok(())
    }

    pub fn workspace_exists(&self, workspace_id: &str) -> SiftResult<bool> {
        self.inner.store.workspace_exists(workspace_id)
    }

    /// Workspace ids, sorted.
    pub fn list_workspaces(&self) -> SiftResult<Vec<String>> {
        self.inner.store.list_workspace_ids()
    }

    pub fn dataset_name(&self, workspace_id: &str) -> SiftResult<String> {
        self.inner.dataset_name(workspace_id)
    }

    /// Dataset names known to the label store, sorted.
    pub fn list_datasets(&self) -> SiftResult<Vec<String>> {
        let mut names = self.inner.labels.dataset_names()?;
        names.sort();
        Ok(names)
    }

    // --- Categories ---

    pub fn create_category(&self, workspace_id: &str, category: &str, description: &str) -> SiftResult<()> {
        self.inner.store.add_category(workspace_id, category, description)?;
        tracing::info!(workspace = workspace_id, category, "category created");
        Ok(())
    }

    /// Deletes every model of the category that is not deleted yet, then
    /// the category. Fails while one of its models is still training.
    pub fn delete_category(&self, workspace_id: &str, category: &str) -> SiftResult<()> {
        let record = self.inner.store.get_category(workspace_id, category)?;
        self.delete_category_models(workspace_id, &record)?;
        self.inner.store.delete_category(workspace_id, category)?;
        self.inner
            .trigger_locks
            .remove(&(workspace_id.to_string(), category.to_string()));
        tracing::info!(workspace = workspace_id, category, "category deleted");
        Ok(())
    }

    pub fn all_categories(&self, workspace_id: &str) -> SiftResult<BTreeMap<String, Category>> {
        Ok(self.inner.store.get_workspace(workspace_id)?.categories)
    }

    fn delete_category_models(&self, workspace_id: &str, category: &Category) -> SiftResult<()> {
        for iteration in &category.iterations {
            if iteration.model.model_status != ModelStatus::Deleted {
                retention::delete_model(&self.inner, workspace_id, &category.name, iteration.index)?;
            }
        }
        Ok(())
    }
}
