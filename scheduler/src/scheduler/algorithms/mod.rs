mod fcfs;
mod mlfq;
mod priority;
mod round_robin;
mod sjf;
mod srtf;

pub use fcfs::Fcfs;
pub use mlfq::Mlfq;
pub use priority::{PriorityNonPreemptive, PriorityPreemptive};
pub use round_robin::RoundRobinScheduler;
pub use sjf::Sjf;
pub use srtf::Srtf;

use super::{
    error::ConfigurationError,
    process::{Process, ProcessId},
    Scheduler,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The closed set of algorithms an engine can be configured with. Resolved
/// once from a key; the engine then holds the built strategy for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Fcfs,
    Sjf,
    Srtf,
    PriorityNp,
    PriorityP,
    Rr,
    Mlfq,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Fcfs,
        Algorithm::Sjf,
        Algorithm::Srtf,
        Algorithm::PriorityNp,
        Algorithm::PriorityP,
        Algorithm::Rr,
        Algorithm::Mlfq,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Algorithm::Fcfs => "fcfs",
            Algorithm::Sjf => "sjf",
            Algorithm::Srtf => "srtf",
            Algorithm::PriorityNp => "priority-np",
            Algorithm::PriorityP => "priority-p",
            Algorithm::Rr => "rr",
            Algorithm::Mlfq => "mlfq",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Fcfs => "First Come First Serve",
            Algorithm::Sjf => "Shortest Job First",
            Algorithm::Srtf => "Shortest Remaining Time First",
            Algorithm::PriorityNp => "Priority (Non-Preemptive)",
            Algorithm::PriorityP => "Priority (Preemptive)",
            Algorithm::Rr => "Round Robin",
            Algorithm::Mlfq => "Multi-Level Feedback Queue",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Algorithm::Fcfs => "FCFS",
            Algorithm::Sjf => "SJF",
            Algorithm::Srtf => "SRTF",
            Algorithm::PriorityNp => "Priority-NP",
            Algorithm::PriorityP => "Priority-P",
            Algorithm::Rr => "RR",
            Algorithm::Mlfq => "MLFQ",
        }
    }

    pub fn is_preemptive(self) -> bool {
        !matches!(
            self,
            Algorithm::Fcfs | Algorithm::Sjf | Algorithm::PriorityNp
        )
    }

    pub fn needs_priority(self) -> bool {
        matches!(self, Algorithm::PriorityNp | Algorithm::PriorityP)
    }

    /// The known weakness of the policy, shown to the user when a run starts.
    pub fn drawback(self) -> &'static str {
        match self {
            Algorithm::Fcfs => {
                "Convoy effect: short processes wait behind long ones, raising the average wait."
            }
            Algorithm::Sjf => {
                "Starvation risk: long jobs may never run while short ones keep arriving."
            }
            Algorithm::Srtf => {
                "High context switching: frequent preemption by shorter jobs adds overhead."
            }
            Algorithm::PriorityNp => {
                "Starvation possible: low priority processes may wait indefinitely."
            }
            Algorithm::PriorityP => {
                "Low priority processes may starve under continuous high priority arrivals."
            }
            Algorithm::Rr => "Frequent context switching: overhead grows as the quantum shrinks.",
            Algorithm::Mlfq => {
                "Complex tuning: a poor queue/quantum setup can degrade performance."
            }
        }
    }

    pub fn build(self) -> Box<dyn Scheduler> {
        match self {
            Algorithm::Fcfs => Box::new(Fcfs),
            Algorithm::Sjf => Box::new(Sjf),
            Algorithm::Srtf => Box::new(Srtf),
            Algorithm::PriorityNp => Box::new(PriorityNonPreemptive),
            Algorithm::PriorityP => Box::new(PriorityPreemptive),
            Algorithm::Rr => Box::new(RoundRobinScheduler::new()),
            Algorithm::Mlfq => Box::new(Mlfq::new()),
        }
    }
}

impl FromStr for Algorithm {
    type Err = ConfigurationError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key.trim().to_ascii_lowercase().as_str() {
            "fcfs" => Ok(Algorithm::Fcfs),
            "sjf" => Ok(Algorithm::Sjf),
            "srtf" | "sjf-preemptive" => Ok(Algorithm::Srtf),
            "priority-np" => Ok(Algorithm::PriorityNp),
            "priority-p" | "priority" => Ok(Algorithm::PriorityP),
            "rr" | "round-robin" => Ok(Algorithm::Rr),
            "mlfq" => Ok(Algorithm::Mlfq),
            _ => Err(ConfigurationError::UnknownAlgorithm(key.to_owned())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Arrived, unfinished processes in `ready`.
fn arrived<'a>(ready: &'a [&'a Process], now: u64) -> impl Iterator<Item = &'a Process> + 'a {
    ready
        .iter()
        .copied()
        .filter(move |process| process.has_arrived(now) && !process.is_completed())
}

/// The arrived process with the smallest key. Keys end with the id, so the
/// choice never depends on ready queue order.
fn min_by_key<K, F>(ready: &[&Process], now: u64, key: F) -> Option<ProcessId>
where
    K: Ord,
    F: Fn(&Process) -> K,
{
    arrived(ready, now)
        .min_by_key(|process| key(process))
        .map(Process::id)
}
