use super::{gantt::GanttEntry, Process};
use serde::Serialize;

/// Aggregate statistics of a run. Valid at any point: an unfinished run
/// reports over the processes completed so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_response_time: f64,
    /// Busy share of the elapsed time, in `0.0..=1.0`.
    pub cpu_utilization: f64,
    pub context_switches: usize,
    /// Completed processes per tick.
    pub throughput: f64,
    pub completed: usize,
    pub busy_ticks: u64,
    pub elapsed_ticks: u64,
}

fn mean(values: impl Iterator<Item = Option<u64>>) -> f64 {
    let (sum, count) = values
        .flatten()
        .fold((0u64, 0u64), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

impl Metrics {
    pub fn compute<'a, I>(completed: I, gantt: &[GanttEntry]) -> Self
    where
        I: IntoIterator<Item = &'a Process>,
        I::IntoIter: Clone,
    {
        let completed = completed.into_iter();

        let elapsed_ticks = gantt.last().map_or(0, |entry| entry.end);
        let busy_ticks = gantt
            .iter()
            .filter(|entry| !entry.slot.is_idle())
            .map(GanttEntry::len)
            .sum();

        let context_switches = gantt
            .windows(2)
            .filter(|pair| match (pair[0].slot.pid(), pair[1].slot.pid()) {
                (Some(before), Some(after)) => before != after,
                _ => false,
            })
            .count();

        let completed_count = completed.clone().count();
        let per_tick = |value: f64| {
            if elapsed_ticks == 0 {
                0.0
            } else {
                value / elapsed_ticks as f64
            }
        };

        Self {
            avg_waiting_time: mean(completed.clone().map(Process::waiting_time)),
            avg_turnaround_time: mean(completed.clone().map(Process::turnaround_time)),
            avg_response_time: mean(completed.map(Process::response_time)),
            cpu_utilization: per_tick(busy_ticks as f64),
            context_switches,
            throughput: per_tick(completed_count as f64),
            completed: completed_count,
            busy_ticks,
            elapsed_ticks,
        }
    }
}
