use serde::{Deserialize, Serialize};

use super::{IterationStatus, ModelStatus};

/// Published by the state store whenever an iteration or its model changes status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub workspace_id: String,
    pub category: String,
    pub iteration: usize,
    pub status: IterationStatus,
    pub model_status: ModelStatus,
}
