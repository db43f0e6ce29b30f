use super::{min_by_key, Process, ProcessId, Scheduler};
use crate::scheduler::SchedulerOptions;

/// First Come First Serve: earliest arrival wins, then the lower id.
/// Never preempts.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fcfs;

impl Scheduler for Fcfs {
    fn name(&self) -> &'static str {
        "First Come First Serve"
    }

    fn select_next(
        &mut self,
        ready: &[&Process],
        now: u64,
        _options: &SchedulerOptions,
    ) -> Option<ProcessId> {
        min_by_key(ready, now, |p| (p.arrival_time(), p.id()))
    }
}
