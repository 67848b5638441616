//! worker_team - run a batch of independent jobs on a bounded pool of workers.
//!
//! At most N jobs execute at once. Every job acquires a worker from the
//! [`WorkerPool`], runs on it, and hands it back; the [`Dispatcher`] waits
//! until all of them are done.
//!
//! # Features
//!
//! - **Bounded pool**: mutex + condition variable, waiters re-check after every wake
//! - **Misuse detection**: double or stale releases are reported, not absorbed
//! - **Pluggable execution**: jobs run through the [`JobExecutor`] trait
//! - **Structured logging**: text or JSON lines via tracing
//! - **Metrics**: Prometheus registry of pool occupancy and job outcomes
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use worker_team::{Dispatcher, SleepExecutor, WorkerPool};
//! use worker_team::jobs::JobGenerator;
//!
//! let pool = Arc::new(WorkerPool::new(3)?);
//! let dispatcher = Dispatcher::new(pool, SleepExecutor::new());
//! let report = dispatcher.run_all(JobGenerator::default().generate(10)).await;
//! assert!(report.is_success());
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

pub mod config;
pub mod dispatcher;
pub mod executor;
pub mod jobs;
pub mod logging;
pub mod observability;
pub mod pool;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use dispatcher::{Dispatcher, JobError, RunReport};
pub use executor::{ExecutorError, JobExecutor, SleepExecutor, StubExecutor};
pub use pool::{PoolError, PoolResult, PoolStatus, Worker, WorkerGuard, WorkerPool};
pub use types::{Job, JobId, JobState, WorkerId};
