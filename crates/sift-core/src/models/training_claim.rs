use serde::{Deserialize, Serialize};

use super::IterationStatus;

/// Outcome of atomically checking and resetting the change counter before
/// starting a new iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingClaim {
    /// The counter held `changes` and has been reset to 0.
    Claimed { changes: u64 },
    /// An iteration is still running; nothing was changed.
    InFlight {
        iteration: usize,
        status: IterationStatus,
    },
    /// Not enough label changes; nothing was changed.
    BelowThreshold { changes: u64 },
}

impl TrainingClaim {
    pub fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed { .. })
    }
}
