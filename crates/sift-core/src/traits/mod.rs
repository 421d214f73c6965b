pub mod active_learner;
pub mod label_store;
pub mod model_provider;
pub mod state_store;
pub mod training_set_selector;

pub use active_learner::{IActiveLearner, RecommendationRequest};
pub use label_store::ILabelStore;
pub use model_provider::IModelProvider;
pub use state_store::IStateStore;
pub use training_set_selector::ITrainingSetSelector;
