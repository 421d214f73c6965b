//! Test fixture loader for sift corpora, plus in-memory implementations of
//! the collaborator traits the orchestrator is wired against.

pub mod fake_learner;
pub mod fake_model;
pub mod label_store;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use sift_core::models::{Document, Label, LabelAssignments, TextElement};

pub use fake_learner::FixedOrderLearner;
pub use fake_model::FakeModelProvider;
pub use label_store::InMemoryLabelStore;

/// Root directory of the test-fixtures crate.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find test-fixtures.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("test-fixtures").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// One element of a corpus fixture with its gold label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusElement {
    pub id: String,
    pub text: String,
    /// Gold label for the fixture's category; `None` means never labeled.
    #[serde(default)]
    pub gold: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub id: String,
    pub elements: Vec<CorpusElement>,
}

/// A small dataset for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    pub dataset: String,
    pub category: String,
    pub documents: Vec<CorpusDocument>,
}

impl Corpus {
    /// Load `corpus/<name>.json`.
    pub fn load(name: &str) -> Self {
        load_fixture(&format!("corpus/{name}.json"))
    }

    /// The documents without labels, ready for ingestion.
    pub fn documents(&self) -> Vec<Document> {
        self.documents
            .iter()
            .map(|doc| Document {
                id: doc.id.clone(),
                elements: doc
                    .elements
                    .iter()
                    .map(|el| TextElement::new(el.id.clone(), el.text.clone()))
                    .collect(),
            })
            .collect()
    }

    pub fn elements(&self) -> impl Iterator<Item = &CorpusElement> {
        self.documents.iter().flat_map(|doc| doc.elements.iter())
    }

    /// Gold labels of the first `count` elements that have one with the
    /// requested polarity.
    pub fn gold_labels(&self, positive: bool, count: usize) -> LabelAssignments {
        self.elements()
            .filter(|el| el.gold == Some(positive))
            .take(count)
            .map(|el| {
                let label = if positive { Label::positive() } else { Label::negative() };
                (
                    el.id.clone(),
                    [(self.category.clone(), label)].into_iter().collect(),
                )
            })
            .collect()
    }
}
