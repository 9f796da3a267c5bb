//! # ClusterKit Scheduler
//!
//! Backend abstraction for SLURM and SGE batch schedulers.
//!
//! ## Features
//!
//! - Backend auto-detection with environment variable override
//! - Submission command synthesis from a typed job specification
//! - Queue query command synthesis and output parsing
//!
//! This crate never executes a command itself: builders and parsers are
//! pure, and running the rendered strings is the caller's responsibility.

pub mod backend;
pub mod error;
pub mod query;
pub mod spec;
pub mod submit;

pub use backend::{Backend, BackendChoice, Environment, SystemEnv, resolve_backend, BACKEND_ENV_VAR};
pub use error::SchedulerError;
pub use query::{JobQuery, JobRecord, SgeQuery, SlurmQuery, query_for};
pub use spec::JobSpec;
pub use submit::{CommandBuilder, SgeSubmit, SlurmSubmit, builder_for, submit_command};
