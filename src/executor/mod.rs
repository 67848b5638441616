//! Job execution backends.
//!
//! The dispatcher runs every job body through the [`JobExecutor`] trait, so
//! the simulated workload can be swapped for an instant or instrumented
//! stand-in.
//!
//! # Available Executors
//!
//! | Executor | Description |
//! |----------|-------------|
//! | [`SleepExecutor`] | Sleeps for the job's duration and narrates start/finish |
//! | [`StubExecutor`] | Completes immediately, useful for tests and benchmarking |
//!
//! # Example
//!
//! ```rust,ignore
//! use worker_team::executor::{JobExecutor, SleepExecutor};
//! use worker_team::types::Job;
//!
//! let executor = SleepExecutor::new();
//! executor.execute(1, &Job::new(1, Duration::from_secs(2))).await?;
//! ```

mod sleep;
mod stub;

use async_trait::async_trait;

pub use sleep::SleepExecutor;
pub use stub::StubExecutor;

use crate::types::{Job, WorkerId};

/// Error type for a failed job body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorError {
    pub message: String,
}

impl ExecutorError {
    /// Error for a job that exceeded its time budget.
    pub fn timeout(limit: std::time::Duration) -> Self {
        Self {
            message: format!("job timed out after {}ms", limit.as_millis()),
        }
    }
}

impl std::fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExecutorError {}

impl From<String> for ExecutorError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ExecutorError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Trait for job execution backends.
///
/// Implementations run while the dispatcher holds a worker for the job and
/// must not touch the pool themselves.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Runs `job` on behalf of `worker`.
    async fn execute(&self, worker: WorkerId, job: &Job) -> Result<(), ExecutorError>;

    /// Returns the name of this executor for logging purposes.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<E> JobExecutor for std::sync::Arc<E>
where
    E: JobExecutor + ?Sized,
{
    async fn execute(&self, worker: WorkerId, job: &Job) -> Result<(), ExecutorError> {
        (**self).execute(worker, job).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_executor_error_from_str() {
        let err: ExecutorError = "disk on fire".into();
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_timeout_error_message() {
        let err = ExecutorError::timeout(Duration::from_millis(1500));
        assert!(err.message.contains("1500ms"));
    }
}
