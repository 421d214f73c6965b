use crate::errors::SiftResult;
use crate::models::{Document, DocumentStatistics, LabelAssignments, LabelCounts, TextElement};

/// Dataset contents and per-workspace labels.
///
/// Elements returned for a workspace carry that workspace's labels.
pub trait ILabelStore: Send + Sync {
    /// Sorted dataset names.
    fn dataset_names(&self) -> SiftResult<Vec<String>>;

    fn dataset_exists(&self, dataset_name: &str) -> SiftResult<bool> {
        Ok(self.dataset_names()?.iter().any(|name| name == dataset_name))
    }

    fn add_documents(
        &self,
        dataset_name: &str,
        documents: &[Document],
    ) -> SiftResult<DocumentStatistics>;

    fn all_elements(&self, workspace_id: &str, dataset_name: &str) -> SiftResult<Vec<TextElement>>;

    /// Elements in the order of `ids`; unknown ids are skipped.
    fn elements_by_ids(
        &self,
        workspace_id: &str,
        dataset_name: &str,
        ids: &[String],
    ) -> SiftResult<Vec<TextElement>>;

    fn labeled_elements(
        &self,
        workspace_id: &str,
        dataset_name: &str,
        category: &str,
    ) -> SiftResult<Vec<TextElement>>;

    fn unlabeled_elements(
        &self,
        workspace_id: &str,
        dataset_name: &str,
        category: &str,
    ) -> SiftResult<Vec<TextElement>>;

    /// With `remove_duplicates`, elements sharing a text count once.
    fn label_counts(
        &self,
        workspace_id: &str,
        dataset_name: &str,
        category: &str,
        remove_duplicates: bool,
    ) -> SiftResult<LabelCounts>;

    /// With `apply_to_duplicates`, every element whose text equals a labeled
    /// element's text gets the same labels.
    fn set_labels(
        &self,
        workspace_id: &str,
        dataset_name: &str,
        assignments: &LabelAssignments,
        apply_to_duplicates: bool,
    ) -> SiftResult<()>;

    fn unset_labels(
        &self,
        workspace_id: &str,
        dataset_name: &str,
        category: &str,
        element_ids: &[String],
        apply_to_duplicates: bool,
    ) -> SiftResult<()>;

    fn delete_all_labels(&self, workspace_id: &str, dataset_name: &str) -> SiftResult<()>;
}
