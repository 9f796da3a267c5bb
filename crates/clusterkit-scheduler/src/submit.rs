//! Submission command synthesis.
//!
//! One builder per backend renders a [`JobSpec`] into the exact string
//! that, when executed by a shell, submits the job. Builders are pure:
//! nothing is executed here.

use crate::backend::{Backend, Environment, resolve_backend};
use crate::error::SchedulerError;
use crate::spec::JobSpec;

/// Renders submission commands for one backend.
pub trait CommandBuilder: Send + Sync {
    /// The backend this builder targets.
    fn backend(&self) -> Backend;

    /// Render the submission command line for `spec`.
    ///
    /// All recognized flags are rendered before the extra flags, and no
    /// free-form content follows them, so appending text (e.g. `" --quiet"`)
    /// to the result stays syntactically valid.
    fn build_submit(&self, spec: &JobSpec) -> Result<String, SchedulerError>;
}

/// SLURM (`sbatch`) submission builder.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlurmSubmit;

impl CommandBuilder for SlurmSubmit {
    fn backend(&self) -> Backend {
        Backend::Slurm
    }

    fn build_submit(&self, spec: &JobSpec) -> Result<String, SchedulerError> {
        spec.validate()?;

        let mut cmd = format!(
            "echo {} | sbatch --job-name={} --time={} --mem={}",
            quote_single(&script_body(spec)),
            spec.job_name,
            spec.time,
            spec.memory_mb,
        );
        if let Some(dir) = &spec.log_directory {
            // %j is substituted with the job id by SLURM at run time.
            cmd.push_str(&format!(" -o {}/{}.%j.txt", dir.display(), spec.job_name));
        }
        append_extra_flags(&mut cmd, spec);
        Ok(cmd)
    }
}

/// SGE (`qsub`) submission builder.
#[derive(Debug, Default, Clone, Copy)]
pub struct SgeSubmit;

impl CommandBuilder for SgeSubmit {
    fn backend(&self) -> Backend {
        Backend::Sge
    }

    fn build_submit(&self, spec: &JobSpec) -> Result<String, SchedulerError> {
        spec.validate()?;

        let mut cmd = format!(
            "echo {} | qsub -N \"{}\" -l h_rt={} -l h_vmem={}M",
            quote_single(&script_body(spec)),
            spec.job_name,
            spec.time,
            spec.memory_mb,
        );
        if let Some(dir) = &spec.log_directory {
            // $JOB_NAME and $JOB_ID are expanded by SGE, not by the caller's
            // shell, hence the single quotes around the path.
            cmd.push_str(&format!(" -j y -o '{}/$JOB_NAME.$JOB_ID.txt'", dir.display()));
        }
        append_extra_flags(&mut cmd, spec);
        Ok(cmd)
    }
}

/// The builder for a resolved backend.
pub fn builder_for(backend: Backend) -> &'static dyn CommandBuilder {
    match backend {
        Backend::Slurm => &SlurmSubmit,
        Backend::Sge => &SgeSubmit,
    }
}

/// Resolve the spec's backend against `env`, then render its submission
/// command.
pub fn submit_command(spec: &JobSpec, env: &dyn Environment) -> Result<String, SchedulerError> {
    let backend = resolve_backend(spec.backend, env)?;
    builder_for(backend).build_submit(spec)
}

fn script_body(spec: &JobSpec) -> String {
    format!("{}\n{}", spec.interpreter, spec.command)
}

fn append_extra_flags(cmd: &mut String, spec: &JobSpec) {
    for flag in &spec.extra_flags {
        cmd.push(' ');
        cmd.push_str(flag);
    }
}

// POSIX single quoting; embedded quotes become '\''.
fn quote_single(text: &str) -> String {
    format!("'{}'", text.replace('\'', "'\\''"))
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
