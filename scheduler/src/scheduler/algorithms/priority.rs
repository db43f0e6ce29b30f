use super::{arrived, min_by_key, Process, ProcessId, Scheduler};
use crate::scheduler::SchedulerOptions;

/// Sort key of a process priority: smaller ranks run first. With
/// `high_priority_first` the scale is flipped.
fn rank(process: &Process, options: &SchedulerOptions) -> i64 {
    let priority = i64::from(process.priority().unwrap_or_default());
    if options.high_priority_first {
        -priority
    } else {
        priority
    }
}

fn select_by_priority(
    ready: &[&Process],
    now: u64,
    options: &SchedulerOptions,
) -> Option<ProcessId> {
    min_by_key(ready, now, |p| (rank(p, options), p.arrival_time(), p.id()))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityNonPreemptive;

impl Scheduler for PriorityNonPreemptive {
    fn name(&self) -> &'static str {
        "Priority (Non-Preemptive)"
    }

    fn select_next(
        &mut self,
        ready: &[&Process],
        now: u64,
        options: &SchedulerOptions,
    ) -> Option<ProcessId> {
        select_by_priority(ready, now, options)
    }
}

/// Re-evaluated every tick: a strictly more important ready process takes
/// the CPU over.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityPreemptive;

impl Scheduler for PriorityPreemptive {
    fn name(&self) -> &'static str {
        "Priority (Preemptive)"
    }

    fn select_next(
        &mut self,
        ready: &[&Process],
        now: u64,
        options: &SchedulerOptions,
    ) -> Option<ProcessId> {
        select_by_priority(ready, now, options)
    }

    fn should_preempt(
        &mut self,
        current: &Process,
        ready: &[&Process],
        now: u64,
        options: &SchedulerOptions,
    ) -> bool {
        let current_rank = rank(current, options);
        arrived(ready, now)
            .filter(|p| p.id() != current.id())
            .any(|p| rank(p, options) < current_rank)
    }
}
