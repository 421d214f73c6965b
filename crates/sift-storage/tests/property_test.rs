//! Property tests: iteration indices stay contiguous under any mix of
//! appends and failures.

use proptest::prelude::*;

use sift_core::models::*;
use sift_core::traits::IStateStore;
use sift_storage::StorageEngine;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn indices_are_exactly_zero_to_n(fail_mask in prop::collection::vec(any::<bool>(), 1..12)) {
        let store = StorageEngine::open_in_memory().unwrap();
        store.create_workspace("ws", "ds").unwrap();
        store.add_category("ws", "cat", "").unwrap();

        for (i, fail) in fail_mask.iter().enumerate() {
            let model = ModelInfo::training(format!("m{i}"), ModelType::new("t"), ModelMetadata::default());
            let index = store.append_iteration("ws", "cat", &model).unwrap();
            prop_assert_eq!(index, i);
            if *fail {
                store.set_model_status("ws", "cat", index, ModelStatus::Error).unwrap();
                store.set_iteration_status("ws", "cat", index, IterationStatus::Error).unwrap();
            }
        }

        let indices: Vec<usize> = store.get_iterations("ws", "cat").unwrap().iter().map(|it| it.index).collect();
        let expected: Vec<usize> = (0..fail_mask.len()).collect();
        prop_assert_eq!(indices, expected);
    }

    #[test]
    fn counter_is_sum_of_increments(increments in prop::collection::vec(0u64..50, 0..20)) {
        let store = StorageEngine::open_in_memory().unwrap();
        store.create_workspace("ws", "ds").unwrap();
        store.add_category("ws", "cat", "").unwrap();
        for by in &increments {
            store.increase_label_change_count("ws", "cat", *by).unwrap();
        }
        prop_assert_eq!(store.label_change_count("ws", "cat").unwrap(), increments.iter().sum::<u64>());
    }
}
