//! Inference cache using moka.
//!
//! Keys are `(model_id, blake3(text))`. Values are predictions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;

use sift_core::config::InferenceCacheConfig;
use sift_core::models::Prediction;

type CacheKey = (String, String);

/// Cache of predictions per model and element text.
pub struct InferenceCache {
    cache: Cache<CacheKey, Prediction>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InferenceCache {
    pub fn new(config: &InferenceCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_idle(Duration::from_secs(config.time_to_idle_secs))
            .support_invalidation_closures()
            .build();
        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn text_hash(text: &str) -> String {
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }

    pub fn get(&self, model_id: &str, text: &str) -> Option<Prediction> {
        let found = self
            .cache
            .get(&(model_id.to_string(), Self::text_hash(text)));
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    pub fn insert(&self, model_id: &str, text: &str, prediction: Prediction) {
        self.cache
            .insert((model_id.to_string(), Self::text_hash(text)), prediction);
    }

    /// Drop every entry of `model_id`.
    pub fn invalidate_model(&self, model_id: &str) {
        let target = model_id.to_string();
        if let Err(e) = self
            .cache
            .invalidate_entries_if(move |key: &CacheKey, _| key.0 == target)
        {
            tracing::warn!(model_id, error = %e, "could not invalidate cached predictions");
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
