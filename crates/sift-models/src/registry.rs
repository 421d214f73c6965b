//! Providers keyed by model type.

use std::collections::HashMap;
use std::sync::Arc;

use sift_core::config::InferenceCacheConfig;
use sift_core::errors::ModelError;
use sift_core::models::ModelType;
use sift_core::traits::IModelProvider;

use crate::cache::InferenceCache;
use crate::caching_provider::CachingProvider;

/// Model families are values: one provider per [`ModelType`].
#[derive(Default, Clone)]
pub struct ModelRegistry {
    providers: HashMap<ModelType, Arc<dyn IModelProvider>>,
    cache: Option<Arc<InferenceCache>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose providers all share one inference cache. A disabled
    /// cache config yields a plain registry.
    pub fn with_cache(config: &InferenceCacheConfig) -> Self {
        Self {
            providers: HashMap::new(),
            cache: config.enabled.then(|| Arc::new(InferenceCache::new(config))),
        }
    }

    /// Register `provider` under its own model type, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn IModelProvider>) {
        let model_type = provider.model_type().clone();
        let provider: Arc<dyn IModelProvider> = match &self.cache {
            Some(cache) => Arc::new(CachingProvider::new(provider, Arc::clone(cache))),
            None => provider,
        };
        tracing::debug!(model_type = %model_type, cached = self.cache.is_some(), "registered model provider");
        self.providers.insert(model_type, provider);
    }

    pub fn get(&self, model_type: &ModelType) -> Result<Arc<dyn IModelProvider>, ModelError> {
        self.providers
            .get(model_type)
            .cloned()
            .ok_or_else(|| ModelError::UnknownModelType {
                model_type: model_type.to_string(),
            })
    }

    pub fn contains(&self, model_type: &ModelType) -> bool {
        self.providers.contains_key(model_type)
    }

    /// Registered model types, sorted.
    pub fn model_types(&self) -> Vec<ModelType> {
        let mut types: Vec<ModelType> = self.providers.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn cache(&self) -> Option<&InferenceCache> {
        self.cache.as_deref()
    }
}
