use proptest::prelude::*;

use scheduling_simulator::{Algorithm, Process, ProcessId};

/// Up to a dozen processes with priorities, so every algorithm accepts them.
pub fn process_set() -> impl Strategy<Value = Vec<Process>> {
    prop::collection::vec((0u64..20, 1u64..10, 0i32..5), 1..=12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (arrival, burst, priority))| {
                Process::with_priority(i as ProcessId + 1, arrival, burst, Some(priority))
                    .unwrap()
            })
            .collect()
    })
}

pub fn algorithm() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(Algorithm::ALL.to_vec())
}
