//! Document ingestion and the catch-up work it schedules.

use serde::Serialize;

use sift_core::errors::SiftResult;
use sift_core::models::{Document, DocumentStatistics, LabelAssignments};

use crate::engine::Orchestrator;
use crate::jobs::catch_up::CatchUpJob;

/// What [`Orchestrator::add_documents`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub statistics: DocumentStatistics,
    /// Workspaces built on the dataset, sorted.
    pub workspaces: Vec<String>,
    /// Catch-up inference jobs queued in the background.
    pub catch_up_jobs: usize,
}

impl Orchestrator {
    /// Add `documents` to `dataset_name`. For every workspace on the
    /// dataset, existing labels are re-applied so new duplicates of labeled
    /// texts inherit them (when configured), and every category with at
    /// least one iteration gets a catch-up job for its latest iteration.
    pub fn add_documents(&self, dataset_name: &str, documents: &[Document]) -> SiftResult<IngestionReport> {
        let shared = &self.inner;
        tracing::info!(dataset = dataset_name, documents = documents.len(), "adding documents");
        let statistics = shared.labels.add_documents(dataset_name, documents)?;

        let workspaces = shared.store.workspaces_for_dataset(dataset_name)?;
        let mut catch_up_jobs = 0;
        for workspace_id in &workspaces {
            let workspace = shared.store.get_workspace(workspace_id)?;
            for (name, category) in &workspace.categories {
                if shared.config.training.apply_labels_to_duplicate_texts {
                    let labeled = shared.labels.labeled_elements(workspace_id, dataset_name, name)?;
                    let assignments: LabelAssignments = labeled
                        .into_iter()
                        .map(|element| (element.id, element.labels))
                        .collect();
                    shared.labels.set_labels(workspace_id, dataset_name, &assignments, true)?;
                }

                if let Some(latest) = category.iterations.last() {
                    let job = CatchUpJob::new(workspace_id, name, dataset_name, latest.index);
                    if shared.catch_up.send(job).is_err() {
                        tracing::warn!(workspace = %workspace_id, category = %name, "catch-up worker is gone");
                        continue;
                    }
                    catch_up_jobs += 1;
                }
            }
        }

        tracing::info!(
            dataset = dataset_name,
            documents = statistics.documents_added,
            elements = statistics.elements_added,
            workspaces = workspaces.len(),
            catch_up_jobs,
            "documents added"
        );
        Ok(IngestionReport {
            statistics,
            workspaces,
            catch_up_jobs,
        })
    }
}
