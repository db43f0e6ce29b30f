use super::process::ProcessId;
use std::fmt;

/// Malformed process configuration, reported when a process is created,
/// admitted to an engine, or when a run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NegativeArrival { id: ProcessId, arrival_time: i64 },
    NonPositiveBurst { id: ProcessId, burst_time: i64 },
    MissingPriority { id: ProcessId, algorithm: &'static str },
    NegativePriority { id: ProcessId, priority: i32 },
    DuplicateId { id: ProcessId },
    IdsExhausted,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeArrival { id, arrival_time } => {
                write!(f, "P{id}: arrival time must be >= 0 (got {arrival_time})")
            }
            Self::NonPositiveBurst { id, burst_time } => {
                write!(f, "P{id}: burst time must be > 0 (got {burst_time})")
            }
            Self::MissingPriority { id, algorithm } => {
                write!(f, "P{id}: {algorithm} requires a priority")
            }
            Self::NegativePriority { id, priority } => {
                write!(f, "P{id}: priority must be >= 0 (got {priority})")
            }
            Self::DuplicateId { id } => write!(f, "P{id}: process id already in use"),
            Self::IdsExhausted => write!(f, "no process ids left to allocate"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Invalid engine configuration: an unknown algorithm key or options that
/// cannot drive a simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    UnknownAlgorithm(String),
    InvalidQuantum(u64),
    InvalidQueueCount(usize),
    InvalidLevelQuantum { level: usize, quantum: u64 },
    MissingLevelQuantums,
    InvalidAgingThreshold(u64),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAlgorithm(key) => write!(f, "unknown algorithm `{key}`"),
            Self::InvalidQuantum(q) => write!(f, "time quantum must be > 0 (got {q})"),
            Self::InvalidQueueCount(n) => write!(f, "MLFQ needs at least one queue (got {n})"),
            Self::InvalidLevelQuantum { level, quantum } => {
                write!(f, "MLFQ level {level} quantum must be > 0 (got {quantum})")
            }
            Self::MissingLevelQuantums => write!(f, "MLFQ needs at least one level quantum"),
            Self::InvalidAgingThreshold(t) => {
                write!(f, "MLFQ aging threshold must be > 0 (got {t})")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    Validation(ValidationError),
    Configuration(ConfigurationError),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation error: {err}"),
            Self::Configuration(err) => write!(f, "configuration error: {err}"),
        }
    }
}

impl std::error::Error for SchedulerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Configuration(err) => Some(err),
        }
    }
}

impl From<ValidationError> for SchedulerError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<ConfigurationError> for SchedulerError {
    fn from(err: ConfigurationError) -> Self {
        Self::Configuration(err)
    }
}
