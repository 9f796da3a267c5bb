//! Bounded retry with exponential backoff for busy-file contention.

use std::thread::sleep;
use std::time::Duration;

use rusqlite::ErrorCode;
use tracing::warn;

use crate::error::StoreError;

/// Retry configuration for store operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Base delay between retries.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Exponential backoff multiplier.
    pub backoff_multiplier: f64,
    /// Add jitter to delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        // Sized for shared networked filesystems where locks clear slowly.
        Self {
            max_retries: 8,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Calculate delay for a given attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let delay = delay.min(self.max_delay.as_millis() as f64);

        let delay_ms = if self.jitter {
            let jitter = rand_jitter(delay * 0.1);
            (delay + jitter) as u64
        } else {
            delay as u64
        };

        Duration::from_millis(delay_ms)
    }
}

/// Simple jitter using system time.
fn rand_jitter(max: f64) -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos as f64 / u32::MAX as f64) * max * 2.0 - max
}

/// Whether an error is the transient "another writer holds the lock" case.
pub(crate) fn is_busy(error: &rusqlite::Error) -> bool {
    matches!(
        error.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
    )
}

pub(crate) fn from_sqlite(error: rusqlite::Error) -> StoreError {
    match error.sqlite_error_code() {
        Some(ErrorCode::NotADatabase) | Some(ErrorCode::DatabaseCorrupt) => {
            StoreError::Corrupt(error.to_string())
        }
        _ => StoreError::Database(error.to_string()),
    }
}

/// Run `operation`, retrying busy conditions with backoff up to the
/// configured ceiling. Non-busy errors propagate immediately.
pub(crate) fn with_retry<T>(
    config: &RetryConfig,
    what: &str,
    mut operation: impl FnMut() -> Result<T, rusqlite::Error>,
) -> Result<T, StoreError> {
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) if is_busy(&e) => {
                if attempt >= config.max_retries {
                    return Err(StoreError::Busy {
                        attempts: attempt + 1,
                        message: e.to_string(),
                    });
                }
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    "Store busy during {} (attempt {}/{}), retrying in {:?}",
                    what,
                    attempt + 1,
                    config.max_retries + 1,
                    delay
                );
                sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(from_sqlite(e)),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
