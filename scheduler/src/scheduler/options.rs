use super::error::ConfigurationError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_QUANTUM: u64 = 3;
pub const DEFAULT_MLFQ_QUEUES: usize = 3;
pub const DEFAULT_MLFQ_QUANTUMS: [u64; 3] = [2, 4, 8];
pub const DEFAULT_MLFQ_AGING_THRESHOLD: u64 = 10;

/// Tunables shared by every algorithm. Each algorithm reads only the keys it
/// understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerOptions {
    /// Round Robin slice length.
    pub quantum: u64,
    /// Rank larger priority values first.
    pub high_priority_first: bool,
    pub mlfq_queues: usize,
    /// Per level quantum. Levels past the end reuse the last entry.
    pub mlfq_quantums: Vec<u64>,
    pub mlfq_aging: bool,
    /// Ticks a ready process may wait before it is promoted one level.
    pub mlfq_aging_threshold: u64,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            high_priority_first: false,
            mlfq_queues: DEFAULT_MLFQ_QUEUES,
            mlfq_quantums: DEFAULT_MLFQ_QUANTUMS.to_vec(),
            mlfq_aging: false,
            mlfq_aging_threshold: DEFAULT_MLFQ_AGING_THRESHOLD,
        }
    }
}

impl SchedulerOptions {
    pub fn with_quantum(quantum: u64) -> Self {
        Self {
            quantum,
            ..Self::default()
        }
    }

    pub fn with_mlfq(queues: usize, quantums: &[u64]) -> Self {
        Self {
            mlfq_queues: queues,
            mlfq_quantums: quantums.to_vec(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.quantum == 0 {
            return Err(ConfigurationError::InvalidQuantum(self.quantum));
        }
        if self.mlfq_queues == 0 {
            return Err(ConfigurationError::InvalidQueueCount(self.mlfq_queues));
        }
        if self.mlfq_quantums.is_empty() {
            return Err(ConfigurationError::MissingLevelQuantums);
        }
        if let Some(level) = self.mlfq_quantums.iter().position(|&q| q == 0) {
            return Err(ConfigurationError::InvalidLevelQuantum { level, quantum: 0 });
        }
        if self.mlfq_aging_threshold == 0 {
            return Err(ConfigurationError::InvalidAgingThreshold(
                self.mlfq_aging_threshold,
            ));
        }
        Ok(())
    }

    /// Quantum of MLFQ `level`, reusing the last configured one past the end.
    pub fn level_quantum(&self, level: usize) -> u64 {
        match self.mlfq_quantums.get(level) {
            Some(&quantum) => quantum,
            None => self
                .mlfq_quantums
                .last()
                .copied()
                .unwrap_or(DEFAULT_MLFQ_QUANTUMS[0]),
        }
    }

    pub fn lowest_level(&self) -> usize {
        self.mlfq_queues.max(1) - 1
    }
}
