use super::{min_by_key, Process, ProcessId, Scheduler};
use crate::scheduler::SchedulerOptions;

/// Non-preemptive Shortest Job First, ranked by total burst time.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sjf;

impl Scheduler for Sjf {
    fn name(&self) -> &'static str {
        "Shortest Job First"
    }

    fn select_next(
        &mut self,
        ready: &[&Process],
        now: u64,
        _options: &SchedulerOptions,
    ) -> Option<ProcessId> {
        min_by_key(ready, now, |p| (p.burst_time(), p.arrival_time(), p.id()))
    }
}
