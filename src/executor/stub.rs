use async_trait::async_trait;

use super::{ExecutorError, JobExecutor};
use crate::types::{Job, WorkerId};

/// Stub executor that finishes every job immediately.
pub struct StubExecutor;

impl StubExecutor {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Default for StubExecutor {
    fn default() -> Self {
        Self
    }
}

#[async_trait]
impl JobExecutor for StubExecutor {
    #[inline]
    async fn execute(&self, worker: WorkerId, job: &Job) -> Result<(), ExecutorError> {
        tracing::trace!(worker, job = job.id, "stub job done");
        Ok(())
    }

    #[inline]
    fn name(&self) -> &'static str {
        "stub"
    }
}
