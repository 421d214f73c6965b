pub mod category;
pub mod element;
pub mod iteration;
pub mod model_info;
pub mod prediction;
pub mod status;
pub mod status_change;
pub mod training_claim;
pub mod workspace;

pub use category::{in_flight, latest_ready_iteration, latest_ready_model, Category};
pub use element::{
    Document, DocumentStatistics, Label, LabelAssignments, LabelCounts, LabelKind, TextElement,
    TrainingExample,
};
pub use iteration::Iteration;
pub use model_info::{ModelInfo, ModelMetadata, ModelType, TrainParams};
pub use prediction::Prediction;
pub use status::{IterationStatus, ModelStatus};
pub use status_change::StatusChange;
pub use training_claim::TrainingClaim;
pub use workspace::Workspace;
