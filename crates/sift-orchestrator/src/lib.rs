//! # sift-orchestrator
//!
//! The active-learning control plane. An [`Orchestrator`] owns the
//! iteration lifecycle of every category (train, infer over the corpus,
//! compute statistics, ask the learner for recommendations), the
//! retraining trigger, model retention, and catch-up inference after new
//! documents arrive.
//!
//! Long-running provider calls run on a bounded job pool; each iteration is
//! driven by its own coordinator task that consumes typed completion events.

pub mod documents;
pub mod engine;
pub mod inference;
pub mod iteration;
pub mod jobs;
pub mod labels;
pub mod retention;
pub mod selector;
pub mod statistics;
pub mod trigger;

pub use documents::IngestionReport;
pub use engine::{Collaborators, Orchestrator};
pub use inference::PredictionFilter;
pub use iteration::state_machine::{Completion, IterationMachine, Phase};
pub use selector::AllLabeledSelector;
