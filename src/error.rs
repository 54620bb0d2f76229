use core::fmt;

/// Fatal simulation errors.
///
/// Everything else (failed contiguous allocation, partial paging,
/// truncated input) degrades gracefully and is surfaced as a
/// [`ProcessWarning`] or a reported count instead.
#[derive(Debug)]
pub enum SimError {
    /// The process source was malformed or unreadable.
    Input(String),
    /// A configuration value was rejected at construction.
    InvalidConfig(&'static str),
    /// Shared state no longer satisfies a structural invariant.
    /// Indicates a defect in the simulation itself, never an expected
    /// runtime condition.
    InvariantViolation(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Input(msg) => write!(f, "input error: {}", msg),
            SimError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            SimError::InvariantViolation(msg) => write!(f, "invariant violation: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Input(err.to_string())
    }
}

/// Non-fatal degradation attached to the affected process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessWarning {
    /// No contiguous block was large enough; the process ran unbound.
    AllocationFailed { requested: usize },
    /// Fewer frames were bound than requested; unbound page slots are
    /// skipped by the access simulation.
    PagingShortfall { bound: usize, requested: usize },
}

impl fmt::Display for ProcessWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessWarning::AllocationFailed { requested } => {
                write!(f, "could not allocate {} bytes of contiguous memory", requested)
            }
            ProcessWarning::PagingShortfall { bound, requested } => {
                write!(f, "only {} of {} pages bound to frames", bound, requested)
            }
        }
    }
}
