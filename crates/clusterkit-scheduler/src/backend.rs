//! Backend identification and detection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SchedulerError;

/// Environment variable that pins the default backend, taking precedence
/// over auto-probing when set to a recognized backend name.
pub const BACKEND_ENV_VAR: &str = "CLUSTERKIT_BACKEND";

/// A concrete scheduler backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Simple Linux Utility for Resource Management.
    Slurm,
    /// Sun Grid Engine.
    Sge,
}

impl Backend {
    /// Command-line tool whose presence identifies this backend.
    fn probe_tool(self) -> &'static str {
        match self {
            Backend::Slurm => "scontrol",
            Backend::Sge => "qmod",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Slurm => write!(f, "slurm"),
            Backend::Sge => write!(f, "sge"),
        }
    }
}

impl FromStr for Backend {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slurm" => Ok(Backend::Slurm),
            "sge" => Ok(Backend::Sge),
            other => Err(SchedulerError::UnknownBackend(other.to_string())),
        }
    }
}

/// A caller's backend request: an explicit backend, or auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Probe the environment for an available scheduler.
    #[default]
    Auto,
    /// Use SLURM without probing.
    Slurm,
    /// Use SGE without probing.
    Sge,
}

impl From<Backend> for BackendChoice {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Slurm => BackendChoice::Slurm,
            Backend::Sge => BackendChoice::Sge,
        }
    }
}

impl FromStr for BackendChoice {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(BackendChoice::Auto),
            other => other.parse::<Backend>().map(BackendChoice::from),
        }
    }
}

/// Execution environment seen by backend detection.
///
/// Detection takes the environment as an argument so resolution is
/// deterministic and testable without mutating process-wide state.
pub trait Environment {
    /// Look up an environment variable.
    fn var(&self, name: &str) -> Option<String>;

    /// Whether a command-line tool is resolvable in this environment.
    fn has_tool(&self, name: &str) -> bool;
}

/// The real process environment, probing tools on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn has_tool(&self, name: &str) -> bool {
        let Some(path) = self.var("PATH") else {
            return false;
        };
        std::env::split_paths(&path).any(|dir| is_executable(&dir.join(name)))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Resolve a backend request against an environment.
///
/// An explicit choice is returned unchanged, even when the corresponding
/// tool is absent: absence is only discovered at execution time by the
/// caller. `Auto` first honors [`BACKEND_ENV_VAR`], then probes for SLURM
/// and SGE in that order.
pub fn resolve_backend(
    choice: BackendChoice,
    env: &dyn Environment,
) -> Result<Backend, SchedulerError> {
    match choice {
        BackendChoice::Slurm => Ok(Backend::Slurm),
        BackendChoice::Sge => Ok(Backend::Sge),
        BackendChoice::Auto => {
            if let Some(value) = env.var(BACKEND_ENV_VAR) {
                let backend = value.parse::<Backend>()?;
                debug!("Backend pinned to {} via {}", backend, BACKEND_ENV_VAR);
                return Ok(backend);
            }

            for backend in [Backend::Slurm, Backend::Sge] {
                if env.has_tool(backend.probe_tool()) {
                    debug!("Detected {} backend ({} found)", backend, backend.probe_tool());
                    return Ok(backend);
                }
            }

            Err(SchedulerError::BackendUnavailable(format!(
                "neither scontrol (slurm) nor qmod (sge) was found and {} is not set",
                BACKEND_ENV_VAR
            )))
        }
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
