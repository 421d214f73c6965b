use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{IterationStatus, ModelInfo};

/// One pass of the train → infer → recommend loop for a category.
///
/// Iterations are append-only: the record survives even after retention
/// deletes its model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Iteration {
    pub index: usize,
    pub model: ModelInfo,
    pub status: IterationStatus,
    #[serde(default)]
    pub statistics: BTreeMap<String, f64>,
    /// Element ids recommended for labeling, best first.
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Iteration {
    pub fn new(index: usize, model: ModelInfo) -> Self {
        Self {
            index,
            model,
            status: IterationStatus::Training,
            statistics: BTreeMap::new(),
            recommendations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn statistic(&self, key: &str) -> Option<f64> {
        self.statistics.get(key).copied()
    }
}
