//! Timing identities and timeline shape that hold for every algorithm.

use std::collections::BTreeMap;

use proptest::prelude::*;

use scheduling_simulator::{
    run_batch, Algorithm, Process, ProcessId, SchedulerOptions, SchedulingEngine,
};

use crate::strategies::{algorithm, process_set};

proptest! {
    #[test]
    fn completed_processes_satisfy_timing_identities(
        processes in process_set(),
        algorithm in algorithm(),
    ) {
        let output = run_batch(&processes, algorithm, &SchedulerOptions::default()).unwrap();

        prop_assert_eq!(output.results.len(), processes.len());
        for process in &output.results {
            prop_assert!(process.is_completed());
            prop_assert_eq!(process.remaining_time(), 0);

            let completion = process.completion_time().unwrap();
            let start = process.start_time().unwrap();
            let turnaround = process.turnaround_time().unwrap();
            let waiting = process.waiting_time().unwrap();

            prop_assert!(start >= process.arrival_time());
            prop_assert_eq!(turnaround, completion - process.arrival_time());
            prop_assert_eq!(waiting + process.burst_time(), turnaround);
            prop_assert_eq!(process.response_time(), Some(start - process.arrival_time()));
        }
    }

    #[test]
    fn gantt_covers_the_run_without_gaps(
        processes in process_set(),
        algorithm in algorithm(),
    ) {
        let output = run_batch(&processes, algorithm, &SchedulerOptions::default()).unwrap();
        let gantt = &output.gantt;

        prop_assert_eq!(gantt.first().map(|entry| entry.start), Some(0));
        for pair in gantt.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
            prop_assert!(pair[0].slot != pair[1].slot);
        }
        prop_assert!(gantt.iter().all(|entry| !entry.is_empty()));

        let last_completion = output
            .results
            .iter()
            .filter_map(Process::completion_time)
            .max();
        prop_assert_eq!(gantt.last().map(|entry| entry.end), last_completion);

        let mut ran: BTreeMap<ProcessId, u64> = BTreeMap::new();
        for entry in gantt {
            if let Some(pid) = entry.slot.pid() {
                *ran.entry(pid).or_default() += entry.len();
            }
        }
        for process in &output.results {
            prop_assert_eq!(ran.get(&process.id()).copied(), Some(process.burst_time()));
        }
    }

    #[test]
    fn non_preemptive_algorithms_run_each_process_once(
        processes in process_set(),
        algorithm in prop::sample::select(vec![
            Algorithm::Fcfs,
            Algorithm::Sjf,
            Algorithm::PriorityNp,
        ]),
    ) {
        let output = run_batch(&processes, algorithm, &SchedulerOptions::default()).unwrap();

        for process in &output.results {
            let segments: Vec<_> = output
                .gantt
                .iter()
                .filter(|entry| entry.slot.pid() == Some(process.id()))
                .collect();
            prop_assert_eq!(segments.len(), 1);
            prop_assert_eq!(segments[0].len(), process.burst_time());
            prop_assert!(!segments[0].preempted);
        }
    }

    #[test]
    fn round_robin_slices_end_at_the_quantum(
        processes in process_set(),
        quantum in 1u64..5,
    ) {
        let options = SchedulerOptions::with_quantum(quantum);
        let output = run_batch(&processes, Algorithm::Rr, &options).unwrap();

        for entry in &output.gantt {
            let Some(pid) = entry.slot.pid() else {
                continue;
            };
            // Past each quantum boundary the process only keeps the CPU when
            // nobody else is waiting for it.
            let mut boundary = entry.start + quantum;
            while boundary < entry.end {
                let contender = output.results.iter().any(|other| {
                    other.id() != pid
                        && other.arrival_time() <= boundary
                        && other.completion_time().is_some_and(|done| done > boundary)
                });
                prop_assert!(!contender, "pid {} kept the CPU at {}", pid, boundary);
                boundary += quantum;
            }
        }
    }

    #[test]
    fn metrics_match_the_timeline(
        processes in process_set(),
        algorithm in algorithm(),
    ) {
        let output = run_batch(&processes, algorithm, &SchedulerOptions::default()).unwrap();
        let total_burst: u64 = processes.iter().map(Process::burst_time).sum();

        let mut engine = SchedulingEngine::new(algorithm);
        engine.set_processes(processes).unwrap();
        engine.run_to_completion().unwrap();
        let metrics = engine.metrics();

        prop_assert_eq!(metrics.busy_ticks, total_burst);
        prop_assert_eq!(metrics.completed, output.results.len());
        prop_assert!(metrics.cpu_utilization > 0.0 && metrics.cpu_utilization <= 1.0);
        prop_assert_eq!(
            metrics.elapsed_ticks,
            output.gantt.last().map_or(0, |entry| entry.end)
        );
    }

    #[test]
    fn mlfq_demotes_one_level_only_after_a_full_quantum(
        processes in process_set(),
        queues in 2usize..5,
    ) {
        let options = SchedulerOptions::with_mlfq(queues, &[1, 2, 4]);
        let mut engine =
            SchedulingEngine::with_options(Algorithm::Mlfq, options.clone()).unwrap();
        engine.set_processes(processes).unwrap();
        engine.start().unwrap();

        let mut levels: BTreeMap<ProcessId, usize> = BTreeMap::new();
        // Ticks each process has run since it was last put on the CPU at its level.
        let mut stint: BTreeMap<ProcessId, u64> = BTreeMap::new();
        let mut last_ran: Option<ProcessId> = None;

        while engine.tick() {
            for process in engine.processes() {
                let id = process.id();
                let Some(level) = engine.queue_level(id) else {
                    continue;
                };
                let previous = levels.insert(id, level).unwrap_or(0);
                prop_assert!(level >= previous);
                prop_assert!(level <= previous + 1);
                prop_assert!(level < queues);
                if level > previous {
                    let ran = stint.get(&id).copied().unwrap_or(0);
                    prop_assert!(
                        ran >= options.level_quantum(previous),
                        "pid {} left level {} after {} ticks",
                        id,
                        previous,
                        ran
                    );
                    stint.insert(id, 0);
                }
            }

            let now = engine.current_time();
            let ran = engine
                .gantt()
                .last()
                .filter(|entry| entry.end == now)
                .and_then(|entry| entry.slot.pid());
            if let Some(id) = ran {
                if last_ran != Some(id) {
                    stint.insert(id, 0);
                }
                *stint.entry(id).or_default() += 1;
            }
            last_ran = ran;

            if let Some(running) = engine.running() {
                let running_level = engine.queue_level(running.id());
                let top_level_waiting = engine
                    .ready_queue()
                    .iter()
                    .any(|ready| engine.queue_level(ready.id()) == Some(0));
                if top_level_waiting {
                    prop_assert_eq!(running_level, Some(0));
                }
            }
        }
    }
}
