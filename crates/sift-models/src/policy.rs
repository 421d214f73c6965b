//! Which model type the trigger trains next.

use sift_core::config::ModelPolicyConfig;
use sift_core::models::ModelType;

/// Model type per iteration number, where the number counts the category's
/// non-failed iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPolicy {
    initial: ModelType,
    switch: Option<(usize, ModelType)>,
}

impl ModelPolicy {
    /// Always the same model type.
    pub fn single(model_type: ModelType) -> Self {
        Self {
            initial: model_type,
            switch: None,
        }
    }

    /// `initial` for the first `after` iterations, `then` afterwards.
    pub fn with_switch(initial: ModelType, after: usize, then: ModelType) -> Self {
        Self {
            initial,
            switch: Some((after, then)),
        }
    }

    pub fn from_config(config: &ModelPolicyConfig) -> Self {
        let initial = ModelType::new(config.initial.clone());
        match &config.switch_to {
            Some(then) => Self::with_switch(initial, config.switch_after, ModelType::new(then.clone())),
            None => Self::single(initial),
        }
    }

    pub fn for_iteration(&self, iteration_number: usize) -> &ModelType {
        match &self.switch {
            Some((after, then)) if iteration_number >= *after => then,
            _ => &self.initial,
        }
    }

    /// Every type this policy can return.
    pub fn model_types(&self) -> Vec<&ModelType> {
        let mut types = vec![&self.initial];
        if let Some((_, then)) = &self.switch {
            types.push(then);
        }
        types
    }
}
