//! Batch, stepped and repeated runs over the same input agree exactly.

use proptest::prelude::*;

use scheduling_simulator::{compare, run_batch, EngineState, SchedulerOptions, SchedulingEngine};

use crate::strategies::{algorithm, process_set};

proptest! {
    #[test]
    fn stepping_with_pauses_matches_batch(
        processes in process_set(),
        algorithm in algorithm(),
        pauses in prop::collection::vec(any::<bool>(), 0..64),
    ) {
        let options = SchedulerOptions::default();
        let batch = run_batch(&processes, algorithm, &options).unwrap();

        let mut engine = SchedulingEngine::with_options(algorithm, options).unwrap();
        engine.set_processes(processes).unwrap();
        engine.start().unwrap();

        let mut pauses = pauses.into_iter();
        while engine.state() != EngineState::Completed {
            if pauses.next().unwrap_or(false) {
                prop_assert!(engine.pause());
                let frozen = engine.output();
                prop_assert!(!engine.tick());
                prop_assert_eq!(engine.output(), frozen);
                prop_assert!(engine.resume());
            }
            prop_assert!(engine.tick());
        }

        prop_assert_eq!(engine.output(), batch);
        prop_assert!(!engine.tick());
    }

    #[test]
    fn reset_then_rerun_is_deterministic(
        processes in process_set(),
        algorithm in algorithm(),
    ) {
        let mut engine = SchedulingEngine::new(algorithm);
        engine.set_processes(processes).unwrap();
        let first = engine.run_to_completion().unwrap();
        let first_metrics = engine.metrics().clone();

        engine.reset();
        let second = engine.run_to_completion().unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(&first_metrics, engine.metrics());
    }

    #[test]
    fn comparison_sides_do_not_interfere(
        processes in process_set(),
        first in algorithm(),
        second in algorithm(),
    ) {
        let options = SchedulerOptions::default();
        let comparison = compare(&processes, first, second, &options).unwrap();

        prop_assert_eq!(comparison.first.output, run_batch(&processes, first, &options).unwrap());
        prop_assert_eq!(comparison.second.output, run_batch(&processes, second, &options).unwrap());
        prop_assert!(processes.iter().all(|p| p.completion_time().is_none()));
    }
}
