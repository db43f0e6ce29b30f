use super::{arrived, Process, ProcessId, Scheduler};
use crate::scheduler::SchedulerOptions;
use std::collections::BTreeMap;

/// FIFO rotation with a fixed quantum. The engine keeps the ready queue in
/// arrival order and re-enqueues a preempted process at the tail, so the
/// head of the queue is always the next one to run.
#[derive(Debug, Default, Clone)]
pub struct RoundRobinScheduler {
    slice_used: BTreeMap<ProcessId, u64>,
}

impl RoundRobinScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slice_used(&self, id: ProcessId) -> u64 {
        self.slice_used.get(&id).copied().unwrap_or(0)
    }
}

impl Scheduler for RoundRobinScheduler {
    fn name(&self) -> &'static str {
        "Round Robin"
    }

    fn select_next(
        &mut self,
        ready: &[&Process],
        now: u64,
        _options: &SchedulerOptions,
    ) -> Option<ProcessId> {
        arrived(ready, now).next().map(Process::id)
    }

    fn should_preempt(
        &mut self,
        current: &Process,
        _ready: &[&Process],
        _now: u64,
        options: &SchedulerOptions,
    ) -> bool {
        self.slice_used(current.id()) >= options.quantum
    }

    fn on_tick(&mut self, process: &Process, _options: &SchedulerOptions) {
        *self.slice_used.entry(process.id()).or_insert(0) += 1;
    }

    fn on_context_switch(
        &mut self,
        new_process: Option<&Process>,
        _now: u64,
        _options: &SchedulerOptions,
    ) {
        if let Some(process) = new_process {
            self.slice_used.insert(process.id(), 0);
        }
    }

    fn on_preempt(&mut self, process: &Process, _now: u64, _options: &SchedulerOptions) {
        self.slice_used.insert(process.id(), 0);
    }

    fn reset(&mut self) {
        self.slice_used.clear();
    }
}
