//! Store errors.

use thiserror::Error;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Lock contention outlasted the retry budget.
    #[error("Store busy after {attempts} attempts: {message}")]
    Busy {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// The underlying busy condition.
        message: String,
    },

    /// The backing file failed the integrity check on open.
    #[error("Store file is corrupt: {0}")]
    Corrupt(String),

    /// A stored payload carries a format version this build cannot decode.
    #[error("Unsupported payload format version: {0}")]
    UnsupportedFormat(i64),

    /// Value encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other database error.
    #[error("Database error: {0}")]
    Database(String),
}
