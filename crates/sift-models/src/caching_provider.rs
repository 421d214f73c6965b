//! A provider decorator that answers repeated inference from the cache.

use std::path::PathBuf;
use std::sync::Arc;

use sift_core::errors::ModelError;
use sift_core::models::{ModelStatus, ModelType, Prediction, TextElement, TrainParams, TrainingExample};
use sift_core::traits::IModelProvider;

use crate::cache::InferenceCache;

/// Wraps a provider with an [`InferenceCache`]. Only the elements missing
/// from the cache reach the inner provider; results are stored on the way
/// back. Deleting a model drops its cached predictions.
pub struct CachingProvider {
    inner: Arc<dyn IModelProvider>,
    cache: Arc<InferenceCache>,
}

impl CachingProvider {
    pub fn new(inner: Arc<dyn IModelProvider>, cache: Arc<InferenceCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &InferenceCache {
        &self.cache
    }
}

impl IModelProvider for CachingProvider {
    fn model_type(&self) -> &ModelType {
        self.inner.model_type()
    }

    fn create_model(&self, params: &TrainParams) -> Result<String, ModelError> {
        self.inner.create_model(params)
    }

    fn train(&self, model_id: &str, examples: &[TrainingExample], params: &TrainParams) -> Result<(), ModelError> {
        self.inner.train(model_id, examples, params)
    }

    fn infer(&self, model_id: &str, elements: &[TextElement], use_cache: bool) -> Result<Vec<Prediction>, ModelError> {
        if !use_cache {
            return self.inner.infer(model_id, elements, false);
        }

        let mut results: Vec<Option<Prediction>> = elements
            .iter()
            .map(|el| self.cache.get(model_id, &el.text))
            .collect();
        let missing: Vec<usize> = results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.is_none().then_some(i))
            .collect();

        if !missing.is_empty() {
            let to_infer: Vec<TextElement> = missing.iter().map(|&i| elements[i].clone()).collect();
            let fresh = self.inner.infer(model_id, &to_infer, false)?;
            if fresh.len() != to_infer.len() {
                return Err(ModelError::InferenceFailed {
                    model_id: model_id.to_string(),
                    reason: format!(
                        "provider returned {} predictions for {} elements",
                        fresh.len(),
                        to_infer.len()
                    ),
                });
            }
            for (&i, prediction) in missing.iter().zip(fresh) {
                self.cache.insert(model_id, &elements[i].text, prediction);
                results[i] = Some(prediction);
            }
        }

        tracing::trace!(
            model_id,
            requested = elements.len(),
            cached = elements.len() - missing.len(),
            "inference served"
        );
        Ok(results.into_iter().flatten().collect())
    }

    fn status(&self, model_id: &str) -> Result<ModelStatus, ModelError> {
        self.inner.status(model_id)
    }

    fn delete(&self, model_id: &str) -> Result<(), ModelError> {
        self.inner.delete(model_id)?;
        self.cache.invalidate_model(model_id);
        Ok(())
    }

    fn export(&self, model_id: &str) -> Result<PathBuf, ModelError> {
        self.inner.export(model_id)
    }
}
