//! Queue query synthesis and output parsing.
//!
//! One implementation per backend builds the read-only command that lists
//! queued or running jobs and parses its captured output. Parsing is pure;
//! executing the command is the caller's responsibility. A collaborator
//! running these commands must drain both stdout and stderr fully before
//! waiting on the child process, or a filled pipe buffer will deadlock it.
//!
//! Parser contracts (the exact formats these parsers accept):
//!
//! - SLURM: output of `squeue --noheader -o '%i %t %j'`, one job per line,
//!   three whitespace-separated columns `<id> <state> <name>`.
//! - SGE: default tabular `qstat` output, a `job-ID ...` header line and a
//!   dashed separator followed by rows whose first five columns are
//!   `job-ID prior name user state`.
//!
//! Lines that do not match the expected column shape are skipped; output
//! with rows but no parseable record at all is rejected.

use std::collections::BTreeSet;

use crate::backend::Backend;
use crate::error::SchedulerError;

/// One queued or running job, as reported by the scheduler at query time.
///
/// A point-in-time snapshot, not a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    /// Job name as decoded text.
    pub name: String,
    /// Scheduler-assigned job id, when the layout carries one.
    pub id: Option<String>,
    /// Scheduler state code, when the layout carries one.
    pub state: Option<String>,
}

/// Builds queue-listing commands and parses their output for one backend.
pub trait JobQuery: Send + Sync {
    /// The backend this query targets.
    fn backend(&self) -> Backend;

    /// The read-only command listing queued/running jobs, optionally
    /// filtered to one user.
    fn build_query(&self, user: Option<&str>) -> String;

    /// Parse captured query output into job records.
    fn parse_records(&self, raw: &[u8]) -> Result<Vec<JobRecord>, SchedulerError>;

    /// Parse captured query output into a deduplicated set of job names.
    fn parse(&self, raw: &[u8]) -> Result<BTreeSet<String>, SchedulerError> {
        Ok(self
            .parse_records(raw)?
            .into_iter()
            .map(|record| record.name)
            .collect())
    }
}

/// SLURM (`squeue`) queue query.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlurmQuery;

impl JobQuery for SlurmQuery {
    fn backend(&self) -> Backend {
        Backend::Slurm
    }

    fn build_query(&self, user: Option<&str>) -> String {
        match user {
            Some(user) => format!("squeue --noheader -o '%i %t %j' -u {user}"),
            None => "squeue --noheader -o '%i %t %j'".to_string(),
        }
    }

    fn parse_records(&self, raw: &[u8]) -> Result<Vec<JobRecord>, SchedulerError> {
        let text = String::from_utf8_lossy(raw);
        let mut records = Vec::new();
        let mut rows = 0usize;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields[0].eq_ignore_ascii_case("JOBID") {
                // Header leaked through; header-only output is an empty queue.
                continue;
            }
            rows += 1;

            if fields.len() < 3 {
                continue;
            }
            records.push(JobRecord {
                name: fields[2..].join(" "),
                id: Some(fields[0].to_string()),
                state: Some(fields[1].to_string()),
            });
        }

        reject_if_nothing_parsed(rows, records, "squeue")
    }
}

/// SGE (`qstat`) queue query.
#[derive(Debug, Default, Clone, Copy)]
pub struct SgeQuery;

impl JobQuery for SgeQuery {
    fn backend(&self) -> Backend {
        Backend::Sge
    }

    fn build_query(&self, user: Option<&str>) -> String {
        match user {
            Some(user) => format!("qstat -u {user}"),
            None => "qstat".to_string(),
        }
    }

    fn parse_records(&self, raw: &[u8]) -> Result<Vec<JobRecord>, SchedulerError> {
        let text = String::from_utf8_lossy(raw);
        let mut records = Vec::new();
        let mut rows = 0usize;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("job-ID") || is_separator(line) {
                continue;
            }
            rows += 1;

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 5 {
                continue;
            }
            records.push(JobRecord {
                name: fields[2].to_string(),
                id: Some(fields[0].to_string()),
                state: Some(fields[4].to_string()),
            });
        }

        reject_if_nothing_parsed(rows, records, "qstat")
    }
}

/// The query for a resolved backend.
pub fn query_for(backend: Backend) -> &'static dyn JobQuery {
    match backend {
        Backend::Slurm => &SlurmQuery,
        Backend::Sge => &SgeQuery,
    }
}

fn is_separator(line: &str) -> bool {
    line.chars().all(|c| c == '-')
}

// Empty or header-only output is an empty queue; rows that all fail to
// parse mean the format contract itself does not hold.
fn reject_if_nothing_parsed(
    rows: usize,
    records: Vec<JobRecord>,
    tool: &str,
) -> Result<Vec<JobRecord>, SchedulerError> {
    if rows > 0 && records.is_empty() {
        return Err(SchedulerError::UnparseableOutput(format!(
            "{tool} output had {rows} row(s) but none matched the expected column layout"
        )));
    }
    Ok(records)
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
