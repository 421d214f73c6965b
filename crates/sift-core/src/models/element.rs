use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Strength of a human label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    #[default]
    Standard,
    Weak,
}

/// Label a user assigned to an element for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub positive: bool,
    #[serde(default)]
    pub kind: LabelKind,
}

impl Label {
    pub fn positive() -> Self {
        Self {
            positive: true,
            kind: LabelKind::Standard,
        }
    }

    pub fn negative() -> Self {
        Self {
            positive: false,
            kind: LabelKind::Standard,
        }
    }

    /// Name used for training label counts: `true`, `false`, `weak_true`, `weak_false`.
    pub fn detailed_name(&self) -> &'static str {
        match (self.kind, self.positive) {
            (LabelKind::Standard, true) => "true",
            (LabelKind::Standard, false) => "false",
            (LabelKind::Weak, true) => "weak_true",
            (LabelKind::Weak, false) => "weak_false",
        }
    }
}

/// A unit of text in a dataset, with its per-category labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub labels: BTreeMap<String, Label>,
}

impl TextElement {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn label_for(&self, category: &str) -> Option<&Label> {
        self.labels.get(category)
    }
}

/// One labeled example handed to a model provider for training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub element_id: String,
    pub text: String,
    pub label: Label,
}

/// Positive/negative label totals of one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub positive: usize,
    pub negative: usize,
}

/// A document to ingest: a group of text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub elements: Vec<TextElement>,
}

/// What an ingestion added to a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatistics {
    pub documents_added: usize,
    pub elements_added: usize,
}

/// Element id → category → label.
pub type LabelAssignments = BTreeMap<String, BTreeMap<String, Label>>;
