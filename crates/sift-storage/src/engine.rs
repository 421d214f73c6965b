//! StorageEngine: owns the ConnectionPool and implements IStateStore.

use std::collections::BTreeMap;
use std::path::Path;

use tokio::sync::broadcast;

use sift_core::config::{defaults, StorageConfig};
use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::{
    in_flight, latest_ready_iteration, Category, Iteration, IterationStatus, ModelInfo, ModelStatus,
    StatusChange, TrainingClaim, Workspace,
};
use sift_core::traits::IStateStore;

use crate::migrations;
use crate::notify::StatusNotifier;
use crate::pool::ConnectionPool;
use crate::queries::{category_ops, counter_ops, iteration_ops, workspace_ops};

/// SQLite state store.
pub struct StorageEngine {
    pool: ConnectionPool,
    /// File-backed mode reads through the read pool. In-memory mode routes
    /// reads through the writer because in-memory readers are isolated.
    use_read_pool: bool,
    notifier: StatusNotifier,
}

impl StorageEngine {
    /// Open a store backed by a file on disk with default settings.
    pub fn open(path: &Path) -> SiftResult<Self> {
        Self::open_with_config(path, &StorageConfig::default(), defaults::DEFAULT_STATUS_CHANNEL_CAPACITY)
    }

    pub fn open_with_config(
        path: &Path,
        config: &StorageConfig,
        status_channel_capacity: usize,
    ) -> SiftResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        let engine = Self {
            pool,
            use_read_pool: true,
            notifier: StatusNotifier::new(status_channel_capacity),
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> SiftResult<Self> {
        let pool = ConnectionPool::open_in_memory(&StorageConfig::default())?;
        let engine = Self {
            pool,
            use_read_pool: false,
            notifier: StatusNotifier::new(defaults::DEFAULT_STATUS_CHANNEL_CAPACITY),
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> SiftResult<()> {
        self.pool.writer.with_conn_sync(|conn| {
            migrations::run_migrations(conn)?;
            Ok(())
        })
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn with_reader<F, T>(&self, f: F) -> SiftResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> SiftResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn_sync(f)
        }
    }

    fn publish(&self, workspace_id: &str, category: &str, iteration: &Iteration) {
        self.notifier.publish(StatusChange {
            workspace_id: workspace_id.to_string(),
            category: category.to_string(),
            iteration: iteration.index,
            status: iteration.status,
            model_status: iteration.model.model_status,
        });
    }

    /// Apply `mutate` to one iteration inside a write transaction and
    /// publish the resulting status.
    fn update_iteration<F>(&self, workspace_id: &str, category: &str, index: usize, mutate: F) -> SiftResult<Iteration>
    where
        F: FnOnce(&rusqlite::Connection, &Iteration) -> SiftResult<()>,
    {
        let updated = self.pool.writer.with_immediate_transaction(|tx| {
            let current = iteration_ops::require_iteration(tx, workspace_id, category, index)?;
            mutate(tx, &current)?;
            iteration_ops::require_iteration(tx, workspace_id, category, index)
        })?;
        self.publish(workspace_id, category, &updated);
        Ok(updated)
    }
}

impl IStateStore for StorageEngine {
    fn create_workspace(&self, workspace_id: &str, dataset_name: &str) -> SiftResult<()> {
        self.pool
            .writer
            .with_immediate_transaction(|tx| workspace_ops::insert_workspace(tx, workspace_id, dataset_name))
    }

    fn get_workspace(&self, workspace_id: &str) -> SiftResult<Workspace> {
        self.with_reader(|conn| {
            let (dataset_name, created_at) = workspace_ops::get_workspace_row(conn, workspace_id)?
                .ok_or_else(|| SiftError::WorkspaceNotFound {
                    workspace_id: workspace_id.to_string(),
                })?;

            let mut categories = BTreeMap::new();
            for row in category_ops::list_category_rows(conn, workspace_id)? {
                let iterations = iteration_ops::list_iterations(conn, workspace_id, &row.name)?;
                categories.insert(
                    row.name.clone(),
                    Category {
                        name: row.name,
                        description: row.description,
                        iterations,
                        label_changes_since_last_train: row.label_changes_since_train,
                    },
                );
            }

            Ok(Workspace {
                workspace_id: workspace_id.to_string(),
                dataset_name,
                categories,
                created_at,
            })
        })
    }

    fn workspace_exists(&self, workspace_id: &str) -> SiftResult<bool> {
        self.with_reader(|conn| workspace_ops::workspace_exists(conn, workspace_id))
    }

    fn list_workspace_ids(&self) -> SiftResult<Vec<String>> {
        self.with_reader(workspace_ops::list_workspace_ids)
    }

    fn workspaces_for_dataset(&self, dataset_name: &str) -> SiftResult<Vec<String>> {
        self.with_reader(|conn| workspace_ops::workspace_ids_for_dataset(conn, dataset_name))
    }

    fn delete_workspace(&self, workspace_id: &str) -> SiftResult<()> {
        self.pool
            .writer
            .with_immediate_transaction(|tx| workspace_ops::delete_workspace(tx, workspace_id))
    }

    fn add_category(&self, workspace_id: &str, name: &str, description: &str) -> SiftResult<()> {
        self.pool.writer.with_immediate_transaction(|tx| {
            category_ops::insert_category(tx, workspace_id, name, description)
        })
    }

    fn get_category(&self, workspace_id: &str, name: &str) -> SiftResult<Category> {
        self.with_reader(|conn| {
            let row = category_ops::require_category(conn, workspace_id, name)?;
            let iterations = iteration_ops::list_iterations(conn, workspace_id, name)?;
            Ok(Category {
                name: row.name,
                description: row.description,
                iterations,
                label_changes_since_last_train: row.label_changes_since_train,
            })
        })
    }

    fn delete_category(&self, workspace_id: &str, name: &str) -> SiftResult<()> {
        self.pool
            .writer
            .with_immediate_transaction(|tx| category_ops::delete_category(tx, workspace_id, name))
    }

    fn append_iteration(&self, workspace_id: &str, category: &str, model: &ModelInfo) -> SiftResult<usize> {
        let iteration = self.pool.writer.with_immediate_transaction(|tx| {
            let index = iteration_ops::insert_iteration(tx, workspace_id, category, model)?;
            iteration_ops::require_iteration(tx, workspace_id, category, index)
        })?;
        tracing::debug!(
            workspace = workspace_id,
            category,
            iteration = iteration.index,
            model_id = %model.model_id,
            "iteration appended"
        );
        self.publish(workspace_id, category, &iteration);
        Ok(iteration.index)
    }

    fn get_iterations(&self, workspace_id: &str, category: &str) -> SiftResult<Vec<Iteration>> {
        self.with_reader(|conn| {
            category_ops::require_category(conn, workspace_id, category)?;
            iteration_ops::list_iterations(conn, workspace_id, category)
        })
    }

    fn get_iteration(&self, workspace_id: &str, category: &str, index: usize) -> SiftResult<Iteration> {
        self.with_reader(|conn| iteration_ops::require_iteration(conn, workspace_id, category, index))
    }

    fn iterations_by_status(
        &self,
        workspace_id: &str,
        category: &str,
        status: IterationStatus,
    ) -> SiftResult<Vec<Iteration>> {
        Ok(self
            .get_iterations(workspace_id, category)?
            .into_iter()
            .filter(|it| it.status == status)
            .collect())
    }

    fn set_iteration_status(
        &self,
        workspace_id: &str,
        category: &str,
        index: usize,
        status: IterationStatus,
    ) -> SiftResult<()> {
        self.update_iteration(workspace_id, category, index, |conn, current| {
            if !current.status.can_transition_to(status) {
                return Err(SiftError::InvalidTransition {
                    workspace_id: workspace_id.to_string(),
                    category: category.to_string(),
                    iteration: index,
                    from: current.status,
                    to: status,
                });
            }
            if status == IterationStatus::Ready && current.model.model_status != ModelStatus::Ready {
                return Err(SiftError::ModelNotReady {
                    workspace_id: workspace_id.to_string(),
                    category: category.to_string(),
                    iteration: index,
                    status: current.model.model_status,
                });
            }
            iteration_ops::update_status(conn, workspace_id, category, index, status)
        })?;
        Ok(())
    }

    fn set_model_status(
        &self,
        workspace_id: &str,
        category: &str,
        index: usize,
        status: ModelStatus,
    ) -> SiftResult<()> {
        self.update_iteration(workspace_id, category, index, |conn, current| {
            check_model_transition(workspace_id, category, current, status)?;
            iteration_ops::update_model_status(conn, workspace_id, category, index, status)
        })?;
        Ok(())
    }

    fn mark_model_deleted(&self, workspace_id: &str, category: &str, index: usize) -> SiftResult<ModelInfo> {
        let mut before = None;
        self.update_iteration(workspace_id, category, index, |conn, current| {
            check_model_transition(workspace_id, category, current, ModelStatus::Deleted)?;
            before = Some(current.model.clone());
            iteration_ops::update_model_status(conn, workspace_id, category, index, ModelStatus::Deleted)
        })?;
        before.ok_or_else(|| SiftError::IterationNotFound {
            workspace_id: workspace_id.to_string(),
            category: category.to_string(),
            iteration: index,
        })
    }

    fn add_iteration_statistics(
        &self,
        workspace_id: &str,
        category: &str,
        index: usize,
        statistics: &BTreeMap<String, f64>,
    ) -> SiftResult<()> {
        self.pool.writer.with_immediate_transaction(|tx| {
            let current = iteration_ops::require_iteration(tx, workspace_id, category, index)?;
            let mut merged = current.statistics;
            merged.extend(statistics.iter().map(|(k, v)| (k.clone(), *v)));
            iteration_ops::update_statistics(tx, workspace_id, category, index, &merged)
        })
    }

    fn set_recommendations(
        &self,
        workspace_id: &str,
        category: &str,
        index: usize,
        element_ids: &[String],
    ) -> SiftResult<()> {
        self.pool.writer.with_immediate_transaction(|tx| {
            iteration_ops::require_iteration(tx, workspace_id, category, index)?;
            iteration_ops::update_recommendations(tx, workspace_id, category, index, element_ids)
        })
    }

    fn current_recommendations(&self, workspace_id: &str, category: &str) -> SiftResult<Vec<String>> {
        let iterations = self.get_iterations(workspace_id, category)?;
        Ok(latest_ready_iteration(&iterations)
            .map(|it| it.recommendations.clone())
            .unwrap_or_default())
    }

    fn label_change_count(&self, workspace_id: &str, category: &str) -> SiftResult<u64> {
        self.with_reader(|conn| counter_ops::get_counter(conn, workspace_id, category))
    }

    fn increase_label_change_count(&self, workspace_id: &str, category: &str, by: u64) -> SiftResult<u64> {
        self.pool
            .writer
            .with_immediate_transaction(|tx| counter_ops::increase_counter(tx, workspace_id, category, by))
    }

    fn reset_label_change_count(&self, workspace_id: &str, category: &str) -> SiftResult<()> {
        self.pool
            .writer
            .with_immediate_transaction(|tx| counter_ops::reset_counter(tx, workspace_id, category))
    }

    fn claim_training(
        &self,
        workspace_id: &str,
        category: &str,
        min_changes: Option<u64>,
    ) -> SiftResult<TrainingClaim> {
        self.pool.writer.with_immediate_transaction(|tx| {
            let changes = counter_ops::get_counter(tx, workspace_id, category)?;
            let iterations = iteration_ops::list_iterations(tx, workspace_id, category)?;

            if let Some(latest) = in_flight(&iterations) {
                return Ok(TrainingClaim::InFlight {
                    iteration: latest.index,
                    status: latest.status,
                });
            }
            if min_changes.is_some_and(|min| changes < min) {
                return Ok(TrainingClaim::BelowThreshold { changes });
            }

            counter_ops::reset_counter(tx, workspace_id, category)?;
            Ok(TrainingClaim::Claimed { changes })
        })
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StatusChange>> {
        Some(self.notifier.subscribe())
    }
}

fn check_model_transition(
    workspace_id: &str,
    category: &str,
    current: &Iteration,
    next: ModelStatus,
) -> SiftResult<()> {
    let from = current.model.model_status;
    if from == ModelStatus::Deleted {
        return Err(SiftError::ModelAlreadyDeleted {
            workspace_id: workspace_id.to_string(),
            category: category.to_string(),
            iteration: current.index,
            model_id: current.model.model_id.clone(),
        });
    }
    if !from.can_transition_to(next) {
        return Err(SiftError::InvalidModelTransition {
            model_id: current.model.model_id.clone(),
            from,
            to: next,
        });
    }
    Ok(())
}
