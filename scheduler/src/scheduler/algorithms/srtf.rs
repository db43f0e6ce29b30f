use super::{arrived, min_by_key, Process, ProcessId, Scheduler};
use crate::scheduler::SchedulerOptions;

/// Shortest Remaining Time First, the preemptive form of SJF.
#[derive(Debug, Default, Clone, Copy)]
pub struct Srtf;

impl Scheduler for Srtf {
    fn name(&self) -> &'static str {
        "Shortest Remaining Time First"
    }

    fn select_next(
        &mut self,
        ready: &[&Process],
        now: u64,
        _options: &SchedulerOptions,
    ) -> Option<ProcessId> {
        min_by_key(ready, now, |p| {
            (p.remaining_time(), p.arrival_time(), p.id())
        })
    }

    fn should_preempt(
        &mut self,
        current: &Process,
        ready: &[&Process],
        now: u64,
        _options: &SchedulerOptions,
    ) -> bool {
        arrived(ready, now)
            .filter(|p| p.id() != current.id())
            .any(|p| p.remaining_time() < current.remaining_time())
    }
}
