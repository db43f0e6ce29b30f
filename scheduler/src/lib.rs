//! Tick driven simulation of classic CPU scheduling policies.
//!
//! A [`SchedulingEngine`] owns a process table and one algorithm strategy,
//! advances a simulated clock one tick at a time and records a gantt
//! timeline plus aggregate [`Metrics`]. The same tick function backs both
//! live step-through and one shot batch runs, so both produce identical
//! results for identical input.

pub mod scheduler;

pub use scheduler::{
    compare, run_batch, Algorithm, BatchOutput, Comparison, EngineObserver, EngineState,
    GanttEntry, GanttSlot, Metrics, Process, ProcessConfig, ProcessId, ProcessState,
    SchedulerError, SchedulerOptions, SchedulingEngine,
};
