//! Scheduler errors.

use thiserror::Error;

/// Scheduler error types.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Job specification is missing or violates a required field.
    #[error("Invalid job spec: {0}")]
    InvalidSpec(String),

    /// Backend name is not one of the supported schedulers.
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    /// Auto-detection found no scheduler and no override was set.
    #[error("No scheduler backend available: {0}")]
    BackendUnavailable(String),

    /// The executed query command reported failure.
    #[error("Scheduler query failed: {0}")]
    QueryFailed(String),

    /// Query output matched none of the known column layouts.
    #[error("Unrecognized scheduler output: {0}")]
    UnparseableOutput(String),
}
