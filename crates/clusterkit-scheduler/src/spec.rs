//! Job specification.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::backend::BackendChoice;
use crate::error::SchedulerError;

fn default_time() -> String {
    "24:00:00".to_string()
}

fn default_memory_mb() -> u32 {
    4000
}

fn default_interpreter() -> String {
    "#!/bin/bash".to_string()
}

/// A single job submission request.
///
/// Created per submission attempt and discarded after rendering; never
/// persisted. Recognized options map onto backend-native flags, while
/// `extra_flags` is an escape hatch appended verbatim, in order, after
/// the rendered flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    /// Command to run. Embedded line breaks are preserved verbatim in the
    /// rendered script body.
    pub command: String,
    /// Job name, embedded into backend flags and used by convention as a
    /// dedup key against [`crate::query::JobQuery`] results.
    pub job_name: String,
    /// Wall-clock time limit (backend-native syntax, e.g. `24:00:00`).
    #[serde(default = "default_time")]
    pub time: String,
    /// Memory limit in megabytes.
    #[serde(default = "default_memory_mb")]
    pub memory_mb: u32,
    /// When set, combined stdout/stderr is written by the scheduler to
    /// `<job_name>.<job_id>.txt` under this directory.
    #[serde(default)]
    pub log_directory: Option<PathBuf>,
    /// Requested backend.
    #[serde(default)]
    pub backend: BackendChoice,
    /// Raw backend flags appended after all recognized flags.
    #[serde(default)]
    pub extra_flags: Vec<String>,
    /// First line of the generated script.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

impl JobSpec {
    /// Create a spec with the backend defaults: 24h wall clock, 4000 MB,
    /// bash interpreter, auto-detected backend.
    pub fn new(command: impl Into<String>, job_name: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            job_name: job_name.into(),
            time: default_time(),
            memory_mb: default_memory_mb(),
            log_directory: None,
            backend: BackendChoice::Auto,
            extra_flags: Vec::new(),
            interpreter: default_interpreter(),
        }
    }

    /// Set the wall-clock time limit.
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    /// Set the memory limit in megabytes.
    pub fn with_memory_mb(mut self, memory_mb: u32) -> Self {
        self.memory_mb = memory_mb;
        self
    }

    /// Set the directory for scheduler-written log files.
    pub fn with_log_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_directory = Some(dir.into());
        self
    }

    /// Set the requested backend.
    pub fn with_backend(mut self, backend: impl Into<BackendChoice>) -> Self {
        self.backend = backend.into();
        self
    }

    /// Append one raw backend flag (e.g. `-m beas` or `--mail-type=ALL`).
    pub fn with_extra_flag(mut self, flag: impl Into<String>) -> Self {
        self.extra_flags.push(flag.into());
        self
    }

    /// Set the script interpreter line.
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Check the invariants every builder relies on.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.command.is_empty() {
            return Err(SchedulerError::InvalidSpec("command is empty".to_string()));
        }
        if self.job_name.is_empty() {
            return Err(SchedulerError::InvalidSpec("job_name is empty".to_string()));
        }
        if !self.job_name.chars().all(is_safe_name_char) {
            return Err(SchedulerError::InvalidSpec(format!(
                "job_name {:?} contains characters that would require shell escaping",
                self.job_name
            )));
        }
        Ok(())
    }
}

// Builders embed the name unescaped into sbatch/qsub flags, so it must not
// need quoting of its own.
fn is_safe_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '=' | '+' | ',' | '@' | ':' | '/')
}
