use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an iteration.
///
/// `Training → RunningInference → RunningActiveLearning → Ready`, with
/// `Error` reachable from every non-terminal status. `Ready` and `Error`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IterationStatus {
    Training,
    RunningInference,
    RunningActiveLearning,
    Ready,
    Error,
}

impl IterationStatus {
    pub const ALL: [IterationStatus; 5] = [
        Self::Training,
        Self::RunningInference,
        Self::RunningActiveLearning,
        Self::Ready,
        Self::Error,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }

    /// Whether `self → next` is an edge of the lifecycle.
    pub fn can_transition_to(self, next: IterationStatus) -> bool {
        use IterationStatus::*;
        match (self, next) {
            (Training, RunningInference)
            | (RunningInference, RunningActiveLearning)
            | (RunningActiveLearning, Ready) => true,
            (from, Error) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Training => "TRAINING",
            Self::RunningInference => "RUNNING_INFERENCE",
            Self::RunningActiveLearning => "RUNNING_ACTIVE_LEARNING",
            Self::Ready => "READY",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for IterationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IterationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown iteration status: {s}"))
    }
}

/// Status of a model artifact owned by a provider.
///
/// `Training → Ready | Error`, then `Ready | Error → Deleted`. Deletion is
/// irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelStatus {
    Training,
    Ready,
    Error,
    Deleted,
}

impl ModelStatus {
    pub const ALL: [ModelStatus; 4] = [Self::Training, Self::Ready, Self::Error, Self::Deleted];

    pub fn can_transition_to(self, next: ModelStatus) -> bool {
        use ModelStatus::*;
        matches!(
            (self, next),
            (Training, Ready) | (Training, Error) | (Ready, Deleted) | (Error, Deleted)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Training => "TRAINING",
            Self::Ready => "READY",
            Self::Error => "ERROR",
            Self::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown model status: {s}"))
    }
}
