//! An in-memory dataset and label store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::{Document, DocumentStatistics, Label, LabelAssignments, LabelCounts, TextElement};
use sift_core::traits::ILabelStore;

type ElementLabels = BTreeMap<String, BTreeMap<String, Label>>;

/// Datasets are shared; labels are kept per workspace.
#[derive(Default)]
pub struct InMemoryLabelStore {
    datasets: RwLock<BTreeMap<String, Vec<TextElement>>>,
    labels: RwLock<HashMap<String, ElementLabels>>,
}

impl InMemoryLabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn dataset(&self, dataset_name: &str) -> SiftResult<Vec<TextElement>> {
        self.datasets
            .read()
            .unwrap()
            .get(dataset_name)
            .cloned()
            .ok_or_else(|| SiftError::DatasetNotFound {
                dataset_name: dataset_name.to_string(),
            })
    }

    fn with_labels(&self, workspace_id: &str, mut elements: Vec<TextElement>) -> Vec<TextElement> {
        let labels = self.labels.read().unwrap();
        if let Some(ws_labels) = labels.get(workspace_id) {
            for el in &mut elements {
                if let Some(l) = ws_labels.get(&el.id) {
                    el.labels = l.clone();
                }
            }
        }
        elements
    }

    /// Ids of `element_id` plus, when `apply_to_duplicates`, every element
    /// with the same text.
    fn targets(elements: &[TextElement], element_id: &str, apply_to_duplicates: bool) -> Vec<String> {
        let text = elements.iter().find(|el| el.id == element_id).map(|el| el.text.as_str());
        match (apply_to_duplicates, text) {
            (true, Some(text)) => elements
                .iter()
                .filter(|el| el.text == text)
                .map(|el| el.id.clone())
                .collect(),
            _ => vec![element_id.to_string()],
        }
    }
}

impl ILabelStore for InMemoryLabelStore {
    fn dataset_names(&self) -> SiftResult<Vec<String>> {
        Ok(self.datasets.read().unwrap().keys().cloned().collect())
    }

    fn add_documents(&self, dataset_name: &str, documents: &[Document]) -> SiftResult<DocumentStatistics> {
        let mut datasets = self.datasets.write().unwrap();
        let elements = datasets.entry(dataset_name.to_string()).or_default();
        let mut stats = DocumentStatistics::default();
        for doc in documents {
            stats.documents_added += 1;
            for el in &doc.elements {
                elements.push(TextElement::new(el.id.clone(), el.text.clone()));
                stats.elements_added += 1;
            }
        }
        Ok(stats)
    }

    fn all_elements(&self, workspace_id: &str, dataset_name: &str) -> SiftResult<Vec<TextElement>> {
        let elements = self.dataset(dataset_name)?;
        Ok(self.with_labels(workspace_id, elements))
    }

    fn elements_by_ids(&self, workspace_id: &str, dataset_name: &str, ids: &[String]) -> SiftResult<Vec<TextElement>> {
        let all = self.all_elements(workspace_id, dataset_name)?;
        let by_id: HashMap<&str, &TextElement> = all.iter().map(|el| (el.id.as_str(), el)).collect();
        Ok(ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|el| (*el).clone()))
            .collect())
    }

    fn labeled_elements(&self, workspace_id: &str, dataset_name: &str, category: &str) -> SiftResult<Vec<TextElement>> {
        Ok(self
            .all_elements(workspace_id, dataset_name)?
            .into_iter()
            .filter(|el| el.labels.contains_key(category))
            .collect())
    }

    fn unlabeled_elements(&self, workspace_id: &str, dataset_name: &str, category: &str) -> SiftResult<Vec<TextElement>> {
        Ok(self
            .all_elements(workspace_id, dataset_name)?
            .into_iter()
            .filter(|el| !el.labels.contains_key(category))
            .collect())
    }

    fn label_counts(
        &self,
        workspace_id: &str,
        dataset_name: &str,
        category: &str,
        remove_duplicates: bool,
    ) -> SiftResult<LabelCounts> {
        let mut seen = HashSet::new();
        let mut counts = LabelCounts::default();
        for el in self.labeled_elements(workspace_id, dataset_name, category)? {
            if remove_duplicates && !seen.insert(el.text.clone()) {
                continue;
            }
            match el.labels.get(category) {
                Some(label) if label.positive => counts.positive += 1,
                Some(_) => counts.negative += 1,
                None => {}
            }
        }
        Ok(counts)
    }

    fn set_labels(
        &self,
        workspace_id: &str,
        dataset_name: &str,
        assignments: &LabelAssignments,
        apply_to_duplicates: bool,
    ) -> SiftResult<()> {
        let elements = self.dataset(dataset_name)?;
        let mut labels = self.labels.write().unwrap();
        let ws_labels = labels.entry(workspace_id.to_string()).or_default();
        for (element_id, categories) in assignments {
            for target in Self::targets(&elements, element_id, apply_to_duplicates) {
                let entry = ws_labels.entry(target).or_default();
                for (category, label) in categories {
                    entry.insert(category.clone(), *label);
                }
            }
        }
        Ok(())
    }

    fn unset_labels(
        &self,
        workspace_id: &str,
        dataset_name: &str,
        category: &str,
        element_ids: &[String],
        apply_to_duplicates: bool,
    ) -> SiftResult<()> {
        let elements = self.dataset(dataset_name)?;
        let mut labels = self.labels.write().unwrap();
        if let Some(ws_labels) = labels.get_mut(workspace_id) {
            for element_id in element_ids {
                for target in Self::targets(&elements, element_id, apply_to_duplicates) {
                    if let Some(entry) = ws_labels.get_mut(&target) {
                        entry.remove(category);
                    }
                }
            }
        }
        Ok(())
    }

    fn delete_all_labels(&self, workspace_id: &str, _dataset_name: &str) -> SiftResult<()> {
        self.labels.write().unwrap().remove(workspace_id);
        Ok(())
    }
}
