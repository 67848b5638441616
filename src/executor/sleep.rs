//! Simulated work: sleep for the job's duration.

use async_trait::async_trait;
use tracing::info;

use super::{ExecutorError, JobExecutor};
use crate::types::{Job, WorkerId};

/// Executor that simulates a workload by sleeping.
///
/// The sleep is a timer await, so a running job never occupies a runtime
/// thread or any pool lock while it "works".
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepExecutor;

impl SleepExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl JobExecutor for SleepExecutor {
    async fn execute(&self, worker: WorkerId, job: &Job) -> Result<(), ExecutorError> {
        let secs = job.duration_secs();

        info!(
            worker,
            job = job.id,
            "Worker {} started the job {} that will take {}s",
            worker,
            job.id,
            secs
        );
        tokio::time::sleep(job.duration).await;
        info!(
            worker,
            job = job.id,
            "Worker {} finished the job {} after {}s",
            worker,
            job.id,
            secs
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "sleep"
    }
}
