use super::{
    algorithms::Algorithm, engine::SchedulingEngine, error::SchedulerError, gantt::GanttEntry,
    metrics::Metrics, options::SchedulerOptions, Process,
};
use serde::Serialize;

/// Final process table and timeline of a run. Stepping an engine tick by
/// tick converges to exactly this value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutput {
    pub results: Vec<Process>,
    pub gantt: Vec<GanttEntry>,
}

/// One algorithm's side of a comparison.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub algorithm: Algorithm,
    pub output: BatchOutput,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub first: RunSummary,
    pub second: RunSummary,
}

fn run_summary(
    processes: &[Process],
    algorithm: Algorithm,
    options: &SchedulerOptions,
) -> Result<RunSummary, SchedulerError> {
    let mut engine = SchedulingEngine::with_options(algorithm, options.clone())?;
    engine.set_auto_sample(false);
    engine.set_processes(processes.to_vec())?;
    let output = engine.run_to_completion()?;
    Ok(RunSummary {
        algorithm,
        output,
        metrics: engine.metrics().clone(),
    })
}

/// Runs `processes` to completion under `algorithm` on a private engine.
/// The caller's processes are cloned, never touched.
pub fn run_batch(
    processes: &[Process],
    algorithm: Algorithm,
    options: &SchedulerOptions,
) -> Result<BatchOutput, SchedulerError> {
    run_summary(processes, algorithm, options).map(|summary| summary.output)
}

/// Runs the same input under two algorithms on two independent engines.
pub fn compare(
    processes: &[Process],
    first: Algorithm,
    second: Algorithm,
    options: &SchedulerOptions,
) -> Result<Comparison, SchedulerError> {
    Ok(Comparison {
        first: run_summary(processes, first, options)?,
        second: run_summary(processes, second, options)?,
    })
}
