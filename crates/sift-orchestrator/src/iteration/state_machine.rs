//! The completion chain of one iteration as an explicit state machine.
//!
//! The machine decides; the coordinator persists. Each completed job is
//! fed in as a [`Completion`] and the machine answers with the statuses to
//! write, the next job to submit, and whether a retention sweep is due.

use std::fmt;

use sift_core::models::{IterationStatus, ModelStatus};

/// Where the iteration is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Training,
    Inference,
    Statistics,
    Recommendation,
    Finished,
}

impl Phase {
    /// The completion this phase waits for.
    fn awaits(self) -> Option<Completion> {
        match self {
            Self::Training => Some(Completion::Trained),
            Self::Inference => Some(Completion::Inferred),
            Self::Statistics => Some(Completion::StatisticsComputed),
            Self::Recommendation => Some(Completion::Recommended),
            Self::Finished => None,
        }
    }
}

/// A job the coordinator observed finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Trained,
    Inferred,
    StatisticsComputed,
    Recommended,
}

impl Completion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trained => "train",
            Self::Inferred => "infer",
            Self::StatisticsComputed => "statistics",
            Self::Recommended => "active_learning",
        }
    }
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work to submit after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextJob {
    Infer,
    ComputeStatistics,
    Recommend,
}

/// What the coordinator has to do after one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    /// Written before `iteration_status`.
    pub model_status: Option<ModelStatus>,
    pub iteration_status: Option<IterationStatus>,
    pub next_job: Option<NextJob>,
    pub sweep: bool,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unexpected {completion} completion while in phase {phase:?}")]
pub struct UnexpectedCompletion {
    pub phase: Phase,
    pub completion: Completion,
}

/// Drives one iteration from TRAINING to READY or ERROR.
#[derive(Debug, Clone)]
pub struct IterationMachine {
    phase: Phase,
}

impl Default for IterationMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl IterationMachine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Training,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn advance(&mut self, completion: Completion, succeeded: bool) -> Result<Transition, UnexpectedCompletion> {
        if self.phase.awaits() != Some(completion) {
            return Err(UnexpectedCompletion {
                phase: self.phase,
                completion,
            });
        }

        let (next_phase, transition) = match (completion, succeeded) {
            (Completion::Trained, true) => (
                Phase::Inference,
                Transition {
                    model_status: Some(ModelStatus::Ready),
                    iteration_status: Some(IterationStatus::RunningInference),
                    next_job: Some(NextJob::Infer),
                    sweep: false,
                },
            ),
            // A model that never trained leaves nothing to sweep.
            (Completion::Trained, false) => (
                Phase::Finished,
                Transition {
                    model_status: Some(ModelStatus::Error),
                    iteration_status: Some(IterationStatus::Error),
                    next_job: None,
                    sweep: false,
                },
            ),
            (Completion::Inferred, true) => (
                Phase::Statistics,
                Transition {
                    next_job: Some(NextJob::ComputeStatistics),
                    ..Transition::default()
                },
            ),
            (Completion::StatisticsComputed, true) => (
                Phase::Recommendation,
                Transition {
                    iteration_status: Some(IterationStatus::RunningActiveLearning),
                    next_job: Some(NextJob::Recommend),
                    ..Transition::default()
                },
            ),
            (Completion::Recommended, true) => (
                Phase::Finished,
                Transition {
                    iteration_status: Some(IterationStatus::Ready),
                    sweep: true,
                    ..Transition::default()
                },
            ),
            (_, false) => (
                Phase::Finished,
                Transition {
                    iteration_status: Some(IterationStatus::Error),
                    sweep: true,
                    ..Transition::default()
                },
            ),
        };

        self.phase = next_phase;
        Ok(transition)
    }

    /// Fail whatever the machine is waiting for. `None` once finished.
    pub fn fail_current(&mut self) -> Option<Transition> {
        let completion = self.phase.awaits()?;
        self.advance(completion, false).ok()
    }
}
