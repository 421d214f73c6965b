use serde::{Deserialize, Serialize};

use super::{Iteration, IterationStatus, ModelStatus};

/// A binary classification target within a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub description: String,
    /// Ordered by index; `iterations[i].index == i`.
    #[serde(default)]
    pub iterations: Vec<Iteration>,
    /// Label changes since the trigger last fired. Never negative.
    #[serde(default)]
    pub label_changes_since_last_train: u64,
}

impl Category {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            iterations: Vec::new(),
            label_changes_since_last_train: 0,
        }
    }

    /// Iterations that did not fail. The model policy is indexed by this.
    pub fn non_error_count(&self) -> usize {
        self.iterations
            .iter()
            .filter(|it| it.status != IterationStatus::Error)
            .count()
    }
}

/// The highest-index iteration whose model is READY.
pub fn latest_ready_model(iterations: &[Iteration]) -> Option<&Iteration> {
    iterations
        .iter()
        .rev()
        .find(|it| it.model.model_status == ModelStatus::Ready)
}

/// The highest-index iteration with status READY.
pub fn latest_ready_iteration(iterations: &[Iteration]) -> Option<&Iteration> {
    iterations
        .iter()
        .rev()
        .find(|it| it.status == IterationStatus::Ready)
}

/// The latest non-ERROR iteration when it has not reached READY yet. A new
/// iteration may only start when this is `None`.
pub fn in_flight(iterations: &[Iteration]) -> Option<&Iteration> {
    iterations
        .iter()
        .rev()
        .find(|it| it.status != IterationStatus::Error)
        .filter(|it| it.status != IterationStatus::Ready)
}
