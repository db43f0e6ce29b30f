use super::{arrived, Process, ProcessId, Scheduler};
use crate::scheduler::SchedulerOptions;
use std::collections::BTreeMap;
use tracing::debug;

/// Multi-Level Feedback Queue.
///
/// Level 0 is the most important queue and every process enters there. A
/// process that uses up its level's quantum drops one level when it leaves
/// the CPU. With aging enabled, a process left waiting in the ready queue
/// for `mlfq_aging_threshold` ticks climbs back one level.
#[derive(Debug, Default, Clone)]
pub struct Mlfq {
    levels: BTreeMap<ProcessId, usize>,
    slice_used: BTreeMap<ProcessId, u64>,
    waiting_since: BTreeMap<ProcessId, u64>,
}

impl Mlfq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, id: ProcessId, options: &SchedulerOptions) -> usize {
        self.levels
            .get(&id)
            .copied()
            .unwrap_or(0)
            .min(options.lowest_level())
    }

    pub fn slice_used(&self, id: ProcessId) -> u64 {
        self.slice_used.get(&id).copied().unwrap_or(0)
    }

    /// Registers processes seen for the first time and applies aging.
    fn refresh(&mut self, ready: &[&Process], now: u64, options: &SchedulerOptions) {
        for process in arrived(ready, now) {
            self.levels.entry(process.id()).or_insert(0);
            self.waiting_since.entry(process.id()).or_insert(now);
        }

        if !options.mlfq_aging {
            return;
        }

        for process in arrived(ready, now) {
            let id = process.id();
            let since = self.waiting_since.get(&id).copied().unwrap_or(now);
            if now.saturating_sub(since) < options.mlfq_aging_threshold {
                continue;
            }
            let level = self.level(id, options);
            if level > 0 {
                debug!(pid = id, from = level, to = level - 1, "mlfq aging promotion");
                self.levels.insert(id, level - 1);
            }
            self.waiting_since.insert(id, now);
        }
    }
}

impl Scheduler for Mlfq {
    fn name(&self) -> &'static str {
        "Multi-Level Feedback Queue"
    }

    fn select_next(
        &mut self,
        ready: &[&Process],
        now: u64,
        options: &SchedulerOptions,
    ) -> Option<ProcessId> {
        self.refresh(ready, now, options);
        arrived(ready, now)
            .min_by_key(|p| (self.level(p.id(), options), p.arrival_time(), p.id()))
            .map(Process::id)
    }

    fn should_preempt(
        &mut self,
        current: &Process,
        ready: &[&Process],
        now: u64,
        options: &SchedulerOptions,
    ) -> bool {
        self.refresh(ready, now, options);

        let level = self.level(current.id(), options);
        if self.slice_used(current.id()) >= options.level_quantum(level) {
            return true;
        }

        arrived(ready, now)
            .filter(|p| p.id() != current.id())
            .any(|p| self.level(p.id(), options) < level)
    }

    fn on_tick(&mut self, process: &Process, _options: &SchedulerOptions) {
        self.levels.entry(process.id()).or_insert(0);
        *self.slice_used.entry(process.id()).or_insert(0) += 1;
    }

    fn on_context_switch(
        &mut self,
        new_process: Option<&Process>,
        _now: u64,
        _options: &SchedulerOptions,
    ) {
        let Some(process) = new_process else {
            return;
        };
        let id = process.id();

        // Demotion happens in `on_preempt`; a dispatch only starts a new slice.
        self.levels.entry(id).or_insert(0);
        self.slice_used.insert(id, 0);
        self.waiting_since.remove(&id);
    }

    fn on_preempt(&mut self, process: &Process, now: u64, options: &SchedulerOptions) {
        let id = process.id();
        let level = self.level(id, options);
        if self.slice_used(id) >= options.level_quantum(level) {
            let demoted = (level + 1).min(options.lowest_level());
            if demoted != level {
                debug!(pid = id, from = level, to = demoted, "mlfq demotion");
            }
            self.levels.insert(id, demoted);
        }
        self.slice_used.insert(id, 0);
        self.waiting_since.insert(id, now);
    }

    fn queue_level(&self, id: ProcessId) -> Option<usize> {
        self.levels.get(&id).copied()
    }

    fn reset(&mut self) {
        self.levels.clear();
        self.slice_used.clear();
        self.waiting_since.clear();
    }
}
