//! A deterministic model provider for tests.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use sift_core::errors::ModelError;
use sift_core::models::{
    ModelStatus, ModelType, Prediction, TextElement, TrainParams, TrainingExample,
};
use sift_core::traits::IModelProvider;

/// Decides the label of one element for one trained model.
pub type Predictor = Arc<dyn Fn(&TextElement) -> bool + Send + Sync>;

struct FakeModel {
    status: ModelStatus,
    predictor: Option<Predictor>,
}

/// In-memory provider.
///
/// By default a trained model predicts positive for any element sharing a
/// word (longer than three characters) with a positive training example
/// that never appears in a negative one. Tests can swap in a fixed
/// predictor, make the next train or infer call fail, or hold training
/// until released.
pub struct FakeModelProvider {
    model_type: ModelType,
    models: Mutex<HashMap<String, FakeModel>>,
    predictor_override: Mutex<Option<Predictor>>,
    next_id: AtomicUsize,
    fail_next_training: AtomicBool,
    fail_next_inference: AtomicBool,
    fail_next_delete: AtomicBool,
    training_gate: (Mutex<bool>, Condvar),
    inference_gate: (Mutex<bool>, Condvar),
    train_calls: AtomicUsize,
    infer_calls: AtomicUsize,
    inferred_elements: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

impl FakeModelProvider {
    pub fn new(model_type: &str) -> Self {
        Self {
            model_type: ModelType::new(model_type),
            models: Mutex::new(HashMap::new()),
            predictor_override: Mutex::new(None),
            next_id: AtomicUsize::new(0),
            fail_next_training: AtomicBool::new(false),
            fail_next_inference: AtomicBool::new(false),
            fail_next_delete: AtomicBool::new(false),
            training_gate: (Mutex::new(false), Condvar::new()),
            inference_gate: (Mutex::new(false), Condvar::new()),
            train_calls: AtomicUsize::new(0),
            infer_calls: AtomicUsize::new(0),
            inferred_elements: AtomicUsize::new(0),
            deleted: Mutex::new(Vec::new()),
        }
    }

    /// Models trained from now on use `predictor`.
    pub fn set_predictor(&self, predictor: impl Fn(&TextElement) -> bool + Send + Sync + 'static) {
        *self.predictor_override.lock().unwrap() = Some(Arc::new(predictor));
    }

    pub fn fail_next_training(&self) {
        self.fail_next_training.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_inference(&self) {
        self.fail_next_inference.store(true, Ordering::SeqCst);
    }

    /// The next `delete` fails and leaves the model in place.
    pub fn fail_next_delete(&self) {
        self.fail_next_delete.store(true, Ordering::SeqCst);
    }

    /// Block every `train` call until [`release_training`](Self::release_training).
    pub fn hold_training(&self) {
        *self.training_gate.0.lock().unwrap() = true;
    }

    pub fn release_training(&self) {
        let (held, cvar) = &self.training_gate;
        *held.lock().unwrap() = false;
        cvar.notify_all();
    }

    /// Block every `infer` call until [`release_inference`](Self::release_inference).
    pub fn hold_inference(&self) {
        *self.inference_gate.0.lock().unwrap() = true;
    }

    pub fn release_inference(&self) {
        let (held, cvar) = &self.inference_gate;
        *held.lock().unwrap() = false;
        cvar.notify_all();
    }

    pub fn train_calls(&self) -> usize {
        self.train_calls.load(Ordering::SeqCst)
    }

    pub fn infer_calls(&self) -> usize {
        self.infer_calls.load(Ordering::SeqCst)
    }

    /// Total elements passed to `infer` across all calls.
    pub fn inferred_elements(&self) -> usize {
        self.inferred_elements.load(Ordering::SeqCst)
    }

    /// Model ids deleted so far, in order.
    pub fn deleted_models(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn vocabulary_predictor(examples: &[TrainingExample]) -> Predictor {
        fn words(text: &str) -> impl Iterator<Item = String> + '_ {
            text.split_whitespace()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
                .filter(|w| w.len() > 3)
        }
        let negative: BTreeSet<String> = examples
            .iter()
            .filter(|ex| !ex.label.positive)
            .flat_map(|ex| words(&ex.text).collect::<Vec<_>>())
            .collect();
        let positive: BTreeSet<String> = examples
            .iter()
            .filter(|ex| ex.label.positive)
            .flat_map(|ex| words(&ex.text).collect::<Vec<_>>())
            .filter(|w| !negative.contains(w))
            .collect();
        Arc::new(move |el: &TextElement| words(&el.text).any(|w| positive.contains(&w)))
    }
}

fn wait_at(gate: &(Mutex<bool>, Condvar)) {
    let (held, cvar) = gate;
    let mut held = held.lock().unwrap();
    while *held {
        held = cvar.wait(held).unwrap();
    }
}

impl IModelProvider for FakeModelProvider {
    fn model_type(&self) -> &ModelType {
        &self.model_type
    }

    fn create_model(&self, _params: &TrainParams) -> Result<String, ModelError> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let model_id = format!("{}-{n}", self.model_type);
        self.models.lock().unwrap().insert(
            model_id.clone(),
            FakeModel {
                status: ModelStatus::Training,
                predictor: None,
            },
        );
        Ok(model_id)
    }

    fn train(&self, model_id: &str, examples: &[TrainingExample], _params: &TrainParams) -> Result<(), ModelError> {
        self.train_calls.fetch_add(1, Ordering::SeqCst);
        wait_at(&self.training_gate);

        let failed = self.fail_next_training.swap(false, Ordering::SeqCst);
        let predictor = self
            .predictor_override
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Self::vocabulary_predictor(examples));

        let mut models = self.models.lock().unwrap();
        let model = models.get_mut(model_id).ok_or_else(|| ModelError::ModelNotFound {
            model_id: model_id.to_string(),
        })?;
        if failed {
            model.status = ModelStatus::Error;
            return Err(ModelError::TrainingFailed {
                model_id: model_id.to_string(),
                reason: "injected training failure".to_string(),
            });
        }
        model.status = ModelStatus::Ready;
        model.predictor = Some(predictor);
        Ok(())
    }

    fn infer(&self, model_id: &str, elements: &[TextElement], _use_cache: bool) -> Result<Vec<Prediction>, ModelError> {
        wait_at(&self.inference_gate);
        self.infer_calls.fetch_add(1, Ordering::SeqCst);
        self.inferred_elements.fetch_add(elements.len(), Ordering::SeqCst);
        if self.fail_next_inference.swap(false, Ordering::SeqCst) {
            return Err(ModelError::InferenceFailed {
                model_id: model_id.to_string(),
                reason: "injected inference failure".to_string(),
            });
        }

        let predictor = {
            let models = self.models.lock().unwrap();
            let model = models.get(model_id).ok_or_else(|| ModelError::ModelNotFound {
                model_id: model_id.to_string(),
            })?;
            match (&model.status, &model.predictor) {
                (ModelStatus::Ready, Some(predictor)) => Arc::clone(predictor),
                (status, _) => {
                    return Err(ModelError::InferenceFailed {
                        model_id: model_id.to_string(),
                        reason: format!("model is {status}"),
                    })
                }
            }
        };

        elements
            .iter()
            .map(|el| {
                let positive = predictor(el);
                Prediction::new(positive, if positive { 0.9 } else { 0.1 })
            })
            .collect()
    }

    fn status(&self, model_id: &str) -> Result<ModelStatus, ModelError> {
        self.models
            .lock()
            .unwrap()
            .get(model_id)
            .map(|m| m.status)
            .ok_or_else(|| ModelError::ModelNotFound {
                model_id: model_id.to_string(),
            })
    }

    fn delete(&self, model_id: &str) -> Result<(), ModelError> {
        if self.fail_next_delete.swap(false, Ordering::SeqCst) {
            return Err(ModelError::DeletionFailed {
                model_id: model_id.to_string(),
                reason: "injected deletion failure".to_string(),
            });
        }
        let mut models = self.models.lock().unwrap();
        let model = models.get_mut(model_id).ok_or_else(|| ModelError::ModelNotFound {
            model_id: model_id.to_string(),
        })?;
        model.status = ModelStatus::Deleted;
        model.predictor = None;
        self.deleted.lock().unwrap().push(model_id.to_string());
        Ok(())
    }

    fn export(&self, model_id: &str) -> Result<PathBuf, ModelError> {
        match self.status(model_id)? {
            ModelStatus::Ready => Ok(std::env::temp_dir().join(format!("{model_id}.model"))),
            status => Err(ModelError::ExportFailed {
                model_id: model_id.to_string(),
                reason: format!("model is {status}"),
            }),
        }
    }
}
