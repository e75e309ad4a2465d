use thiserror::Error;
use crate::counter::lifecycle::Lifecycle;

#[derive(Error, Debug)]
pub enum Error {
    // Construction Errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Usage Errors
    #[error("Invalid state: {operation} requires the counter to be {expected}, but it is {actual}")]
    InvalidState {
        operation: &'static str,
        expected: Lifecycle,
        actual: Lifecycle,
    },

    // Scheduling Errors
    #[error("Scheduler error: {0}")]
    SchedulerError(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for faults caused by calling an operation in the wrong lifecycle state.
    pub fn is_usage_fault(&self) -> bool {
        matches!(self, Error::InvalidState { .. })
    }
}
