mod algorithms;
mod batch;
mod engine;
mod error;
mod gantt;
mod metrics;
mod observer;
mod options;
mod process;
mod rng;
pub mod samples;

pub use algorithms::{
    Algorithm, Fcfs, Mlfq, PriorityNonPreemptive, PriorityPreemptive, RoundRobinScheduler, Sjf,
    Srtf,
};
pub use batch::{compare, run_batch, BatchOutput, Comparison, RunSummary};
pub use engine::{EngineState, SchedulingEngine};
pub use error::{ConfigurationError, SchedulerError, ValidationError};
pub use gantt::{GanttEntry, GanttRecorder, GanttSlot};
pub use metrics::Metrics;
pub use observer::{EngineObserver, NoopObserver};
pub use options::SchedulerOptions;
pub use process::{IdAllocator, Process, ProcessConfig, ProcessId, ProcessState};
pub use rng::XorShift64;

/// Decision making half of a scheduling algorithm.
///
/// An engine owns exactly one boxed instance, so any bookkeeping a variant
/// keeps in `self` is private to that engine's run. `ready` never contains
/// the running process and lists processes in ready queue order.
pub trait Scheduler {
    fn name(&self) -> &'static str;

    /// Picks the process to run next among the arrived ones in `ready`.
    fn select_next(
        &mut self,
        ready: &[&Process],
        now: u64,
        options: &SchedulerOptions,
    ) -> Option<ProcessId>;

    /// Whether `current` must give up the CPU before running this tick.
    fn should_preempt(
        &mut self,
        _current: &Process,
        _ready: &[&Process],
        _now: u64,
        _options: &SchedulerOptions,
    ) -> bool {
        false
    }

    /// Called after `process` ran for one tick.
    fn on_tick(&mut self, _process: &Process, _options: &SchedulerOptions) {}

    /// Called whenever a process is put on the CPU, and with `None` when the
    /// CPU is released by a completion.
    fn on_context_switch(
        &mut self,
        _new_process: Option<&Process>,
        _now: u64,
        _options: &SchedulerOptions,
    ) {
    }

    /// Called when `process` was preempted and went back to the ready queue,
    /// before the replacement is selected.
    fn on_preempt(&mut self, _process: &Process, _now: u64, _options: &SchedulerOptions) {}

    /// Feedback queue level of `id`, for algorithms that keep levels.
    fn queue_level(&self, _id: ProcessId) -> Option<usize> {
        None
    }

    fn reset(&mut self) {}
}
