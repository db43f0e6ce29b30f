//! Generated process sets used when a run starts without user input and for
//! stress runs.

use super::{process::ProcessId, rng::XorShift64, Process};

pub const DEFAULT_SAMPLE_COUNT: usize = 5;
pub const DEFAULT_STRESS_COUNT: usize = 100;
pub const DEFAULT_SEED: u64 = 0x5EED_CAFE;

struct Shape {
    max_arrival: u64,
    max_burst: u64,
    max_priority: u64,
}

const SAMPLE: Shape = Shape {
    max_arrival: 8,
    max_burst: 10,
    max_priority: 5,
};

const STRESS: Shape = Shape {
    max_arrival: 60,
    max_burst: 15,
    max_priority: 10,
};

fn generate(count: usize, seed: u64, shape: &Shape) -> Vec<Process> {
    let mut rng = XorShift64::new(seed);
    let mut processes: Vec<Process> = (1..=count)
        .map(|n| {
            let arrival = rng.range(0, shape.max_arrival);
            let burst = rng.range(1, shape.max_burst);
            let priority = rng.range(1, shape.max_priority) as i32;
            Process::assemble(n as ProcessId, arrival, burst, Some(priority))
        })
        .collect();

    // The first process always arrives at 0 so a run never opens idle.
    if let Some(first) = processes.first_mut() {
        *first = Process::assemble(first.id(), 0, first.burst_time(), first.priority());
    }
    processes
}

/// A handful of processes with small arrivals and bursts, ids `1..=count`.
pub fn sample_processes(count: usize, seed: u64) -> Vec<Process> {
    generate(count, seed, &SAMPLE)
}

/// Many processes spread over a longer arrival window.
pub fn stress_processes(count: usize, seed: u64) -> Vec<Process> {
    generate(count, seed, &STRESS)
}
