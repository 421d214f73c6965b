use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Category;

/// A labeling project over one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub workspace_id: String,
    pub dataset_name: String,
    #[serde(default)]
    pub categories: BTreeMap<String, Category>,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(workspace_id: impl Into<String>, dataset_name: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            dataset_name: dataset_name.into(),
            categories: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }
}
