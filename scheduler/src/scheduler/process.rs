use super::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ProcessId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Waiting,
    Ready,
    Running,
    Completed,
}

impl ProcessState {
    fn can_become(self, next: ProcessState) -> bool {
        use ProcessState::*;
        matches!(
            (self, next),
            (Waiting, Ready) | (Ready, Running) | (Running, Ready) | (Running, Completed)
        )
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessState::Waiting => "waiting",
            ProcessState::Ready => "ready",
            ProcessState::Running => "running",
            ProcessState::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Host supplied configuration of a process, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessConfig {
    #[serde(default)]
    pub id: Option<ProcessId>,
    #[serde(default)]
    pub name: Option<String>,
    pub arrival_time: i64,
    pub burst_time: i64,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl ProcessConfig {
    pub fn new(arrival_time: i64, burst_time: i64) -> Self {
        Self {
            id: None,
            name: None,
            arrival_time,
            burst_time,
            priority: None,
        }
    }

    pub fn with_priority(arrival_time: i64, burst_time: i64, priority: i32) -> Self {
        Self {
            priority: Some(priority),
            ..Self::new(arrival_time, burst_time)
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }
}

/// One schedulable unit.
///
/// Configuration fields never change after creation. The run state and the
/// derived results belong to the engine that admitted the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    id: ProcessId,
    name: String,
    arrival_time: u64,
    burst_time: u64,
    priority: Option<i32>,

    remaining_time: u64,
    state: ProcessState,

    start_time: Option<u64>,
    completion_time: Option<u64>,
    turnaround_time: Option<u64>,
    waiting_time: Option<u64>,
    response_time: Option<u64>,
}

impl Process {
    /// Validates `config` and builds a process with the given id. An id
    /// carried by the config is ignored here; engines decide ids.
    pub fn create(id: ProcessId, config: &ProcessConfig) -> Result<Self, ValidationError> {
        if config.arrival_time < 0 {
            return Err(ValidationError::NegativeArrival {
                id,
                arrival_time: config.arrival_time,
            });
        }
        if config.burst_time <= 0 {
            return Err(ValidationError::NonPositiveBurst {
                id,
                burst_time: config.burst_time,
            });
        }

        let name = match &config.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("P{id}"),
        };
        let mut process = Process::assemble(
            id,
            config.arrival_time as u64,
            config.burst_time as u64,
            config.priority,
        );
        process.name = name;
        Ok(process)
    }

    pub fn new(
        id: ProcessId,
        arrival_time: u64,
        burst_time: u64,
    ) -> Result<Self, ValidationError> {
        Process::with_priority(id, arrival_time, burst_time, None)
    }

    pub fn with_priority(
        id: ProcessId,
        arrival_time: u64,
        burst_time: u64,
        priority: Option<i32>,
    ) -> Result<Self, ValidationError> {
        if burst_time == 0 {
            return Err(ValidationError::NonPositiveBurst { id, burst_time: 0 });
        }
        Ok(Process::assemble(id, arrival_time, burst_time, priority))
    }

    /// Callers have already checked `burst_time > 0`.
    pub(crate) fn assemble(
        id: ProcessId,
        arrival_time: u64,
        burst_time: u64,
        priority: Option<i32>,
    ) -> Self {
        debug_assert!(burst_time > 0);
        Self {
            id,
            name: format!("P{id}"),
            arrival_time,
            burst_time,
            priority,
            remaining_time: burst_time,
            state: ProcessState::Waiting,
            start_time: None,
            completion_time: None,
            turnaround_time: None,
            waiting_time: None,
            response_time: None,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arrival_time(&self) -> u64 {
        self.arrival_time
    }

    pub fn burst_time(&self) -> u64 {
        self.burst_time
    }

    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn remaining_time(&self) -> u64 {
        self.remaining_time
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn start_time(&self) -> Option<u64> {
        self.start_time
    }

    pub fn completion_time(&self) -> Option<u64> {
        self.completion_time
    }

    pub fn turnaround_time(&self) -> Option<u64> {
        self.turnaround_time
    }

    pub fn waiting_time(&self) -> Option<u64> {
        self.waiting_time
    }

    pub fn response_time(&self) -> Option<u64> {
        self.response_time
    }

    pub fn is_completed(&self) -> bool {
        self.state == ProcessState::Completed
    }

    pub fn has_arrived(&self, now: u64) -> bool {
        self.arrival_time <= now
    }

    /// Priority checks for algorithms that rank by it.
    pub fn validate_priority(&self, algorithm: &'static str) -> Result<(), ValidationError> {
        match self.priority {
            None => Err(ValidationError::MissingPriority {
                id: self.id,
                algorithm,
            }),
            Some(priority) if priority < 0 => Err(ValidationError::NegativePriority {
                id: self.id,
                priority,
            }),
            Some(_) => Ok(()),
        }
    }

    /// Restores the run state, clearing every derived result.
    pub fn reset(&mut self) {
        self.remaining_time = self.burst_time;
        self.state = ProcessState::Waiting;
        self.start_time = None;
        self.completion_time = None;
        self.turnaround_time = None;
        self.waiting_time = None;
        self.response_time = None;
    }

    pub(crate) fn set_state(&mut self, next: ProcessState) {
        debug_assert!(
            self.state.can_become(next),
            "P{}: illegal transition {} -> {}",
            self.id,
            self.state,
            next
        );
        self.state = next;
    }

    /// Moves to `Running`, recording the first dispatch time.
    pub(crate) fn dispatch(&mut self, now: u64) {
        self.set_state(ProcessState::Running);
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
    }

    /// Runs for one tick. Returns true once the process has no work left.
    pub(crate) fn execute_tick(&mut self) -> bool {
        debug_assert!(self.remaining_time > 0);
        self.remaining_time -= 1;
        self.remaining_time == 0
    }

    /// Marks the process completed at `completion_time` and fills in the
    /// derived results.
    pub(crate) fn complete(&mut self, completion_time: u64) {
        self.set_state(ProcessState::Completed);

        let turnaround = completion_time - self.arrival_time;
        let start = self.start_time.unwrap_or(completion_time - self.burst_time);
        self.completion_time = Some(completion_time);
        self.turnaround_time = Some(turnaround);
        self.waiting_time = Some(turnaround - self.burst_time);
        self.response_time = Some(start - self.arrival_time);
    }
}

/// Hands out monotonically increasing process ids. Once `ProcessId::MAX`
/// has been handed out or observed there is nothing left to allocate.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: Option<ProcessId>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: Some(1) }
    }

    pub fn next_id(&mut self) -> Option<ProcessId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(id)
    }

    /// Makes sure ids handed out later never collide with `id`.
    pub fn observe(&mut self, id: ProcessId) {
        if let Some(next) = self.next {
            if id >= next {
                self.next = id.checked_add(1);
            }
        }
    }

    pub fn clear(&mut self) {
        self.next = Some(1);
    }
}
