//! # ClusterKit Storage
//!
//! Single-file, transactional key-value store for marking work as done
//! from many unrelated processes sharing a filesystem.
//!
//! ## Features
//!
//! - One SQLite file, one table, opaque versioned value payloads
//! - Atomic per-call transactions: a write fully lands or fully fails
//! - Bounded, jittered retry on lock contention instead of blocking
//!
//! Typical use: worker processes `dump` a result under a key derived from
//! their job parameters, and the orchestrating process reads the store to
//! skip already-completed work.

pub mod error;
pub mod retry;
pub mod store;

pub use error::StoreError;
pub use retry::RetryConfig;
pub use store::SqliteStore;
