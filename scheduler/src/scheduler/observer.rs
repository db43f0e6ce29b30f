use super::{gantt::GanttEntry, metrics::Metrics, Process};

/// Host callbacks fired by an engine after every tick.
///
/// Per tick the engine first reports the edge events of that tick
/// (`on_context_switch`, then `on_process_complete` for a completion) and
/// then always calls `on_tick`, `on_gantt_update` and `on_metrics_update`
/// in that order. All engine state is already consistent when the first
/// callback runs, and nothing a callback does feeds back into scheduling.
pub trait EngineObserver {
    fn on_tick(&mut self, _time: u64, _running: Option<&Process>) {}
    fn on_gantt_update(&mut self, _gantt: &[GanttEntry]) {}
    fn on_metrics_update(&mut self, _metrics: &Metrics) {}
    fn on_context_switch(&mut self) {}
    fn on_process_complete(&mut self, _process: &Process) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}
