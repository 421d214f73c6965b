use proptest::prelude::*;
use sift_core::models::{IterationStatus, ModelStatus};
use sift_orchestrator::{Completion, IterationMachine, Phase};

const COMPLETIONS: [Completion; 4] = [
    Completion::Trained,
    Completion::Inferred,
    Completion::StatisticsComputed,
    Completion::Recommended,
];

fn events() -> impl Strategy<Value = Vec<(usize, bool)>> {
    prop::collection::vec((0..COMPLETIONS.len(), prop::bool::weighted(0.8)), 0..12)
}

proptest! {
    #[test]
    fn emitted_statuses_follow_the_lifecycle(events in events()) {
        let mut machine = IterationMachine::new();
        let mut status = IterationStatus::Training;
        let mut model = ModelStatus::Training;
        let mut sweeps = 0;

        for (which, succeeded) in events {
            let before = machine.phase();
            match machine.advance(COMPLETIONS[which], succeeded) {
                Ok(transition) => {
                    if let Some(next) = transition.iteration_status {
                        prop_assert!(status.can_transition_to(next), "{status} -> {next}");
                        status = next;
                    }
                    if let Some(next) = transition.model_status {
                        prop_assert!(model.can_transition_to(next), "{model} -> {next}");
                        model = next;
                    }
                    if transition.sweep {
                        sweeps += 1;
                        prop_assert!(machine.is_finished());
                    }
                }
                Err(_) => prop_assert_eq!(machine.phase(), before),
            }
        }

        prop_assert!(sweeps <= 1);
        prop_assert_eq!(machine.is_finished(), status.is_terminal());
        if model == ModelStatus::Error {
            prop_assert_eq!(status, IterationStatus::Error);
            prop_assert_eq!(sweeps, 0);
        }
    }

    #[test]
    fn failing_the_current_phase_always_terminates(successes in 0usize..4) {
        let mut machine = IterationMachine::new();
        for completion in &COMPLETIONS[..successes] {
            prop_assert!(machine.advance(*completion, true).is_ok());
        }
        let transition = machine.fail_current().unwrap();
        prop_assert_eq!(transition.iteration_status, Some(IterationStatus::Error));
        prop_assert_eq!(machine.phase(), Phase::Finished);
        prop_assert!(machine.fail_current().is_none());
    }
}
