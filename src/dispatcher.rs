//! Fans jobs out to pooled workers and joins on their completion.
//!
//! Every job gets its own task. Tasks first queue on an async gate with one
//! permit per worker, so at most `pool.size()` of them at a time block (on the
//! blocking thread pool) until a worker is free. The task then runs the job
//! body through the [`JobExecutor`] and hands the worker back. [`Dispatcher::run_all`] returns once every task
//! has reached [`JobState::Done`].

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn, Instrument};
use uuid::Uuid;

use crate::executor::{ExecutorError, JobExecutor};
use crate::observability::Metrics;
use crate::pool::{PoolError, WorkerGuard, WorkerPool};
use crate::types::{Job, JobId, JobState};

/// Why a single job did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// No worker could be acquired, or the release was rejected.
    Pool(PoolError),
    /// The job body returned an error or ran out of time.
    Execution(ExecutorError),
    /// The job body panicked.
    Panicked(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::Pool(e) => write!(f, "pool error: {}", e),
            JobError::Execution(e) => write!(f, "execution error: {}", e),
            JobError::Panicked(msg) => write!(f, "job panicked: {}", msg),
        }
    }
}

impl std::error::Error for JobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JobError::Pool(e) => Some(e),
            JobError::Execution(e) => Some(e),
            JobError::Panicked(_) => None,
        }
    }
}

impl From<PoolError> for JobError {
    fn from(e: PoolError) -> Self {
        JobError::Pool(e)
    }
}

impl From<ExecutorError> for JobError {
    fn from(e: ExecutorError) -> Self {
        JobError::Execution(e)
    }
}

/// Summary of one [`Dispatcher::run_all`] call.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Correlation id attached to every log line of the run.
    pub run_id: Uuid,
    /// Number of jobs dispatched.
    pub total: usize,
    /// Jobs whose body finished successfully.
    pub completed: usize,
    /// Jobs that failed, with the reason.
    pub failures: Vec<(JobId, JobError)>,
    /// Wall time of the whole run.
    pub elapsed: Duration,
}

impl RunReport {
    fn empty(run_id: Uuid) -> Self {
        Self {
            run_id,
            total: 0,
            completed: 0,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Number of failed jobs.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Returns true when every job succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of one job task.
struct JobOutcome {
    job: JobId,
    result: Result<(), JobError>,
}

/// Runs jobs on a bounded [`WorkerPool`].
pub struct Dispatcher<E> {
    pool: Arc<WorkerPool>,
    gate: Arc<Semaphore>,
    executor: Arc<E>,
    metrics: Option<Arc<Metrics>>,
    job_timeout: Option<Duration>,
}

impl<E> Dispatcher<E>
where
    E: JobExecutor + 'static,
{
    pub fn new(pool: Arc<WorkerPool>, executor: E) -> Self {
        Self {
            gate: Arc::new(Semaphore::new(pool.size())),
            pool,
            executor: Arc::new(executor),
            metrics: None,
            job_timeout: None,
        }
    }

    /// Record pool and job metrics into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        metrics.update_worker_metrics(self.pool.in_use(), self.pool.size());
        self.metrics = Some(metrics);
        self
    }

    /// Fail jobs whose body runs longer than `timeout`.
    pub fn with_job_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// The pool jobs are dispatched to.
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// The executor running job bodies.
    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    /// Run every job to completion and report the outcome.
    ///
    /// Jobs run concurrently in no particular order, at most
    /// `pool.size()` at a time. Failed jobs are counted in the report and
    /// never keep their worker.
    pub async fn run_all<I>(&self, jobs: I) -> RunReport
    where
        I: IntoIterator<Item = Job>,
    {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);

        self.run_all_inner(run_id, jobs).instrument(span).await
    }

    async fn run_all_inner<I>(&self, run_id: Uuid, jobs: I) -> RunReport
    where
        I: IntoIterator<Item = Job>,
    {
        let mut jobs = jobs.into_iter().peekable();
        if jobs.peek().is_none() {
            debug!("no jobs to run");
            return RunReport::empty(run_id);
        }

        let started = Instant::now();
        let mut tasks = JoinSet::new();

        for job in jobs {
            let task = JobTask {
                pool: Arc::clone(&self.pool),
                gate: Arc::clone(&self.gate),
                executor: Arc::clone(&self.executor),
                metrics: self.metrics.clone(),
                job_timeout: self.job_timeout,
            };
            tasks.spawn(task.run(job).in_current_span());
        }

        let total = tasks.len();
        info!(
            jobs = total,
            workers = self.pool.size(),
            executor = self.executor.name(),
            "dispatching jobs"
        );

        let mut report = RunReport::empty(run_id);
        report.total = total;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(JobOutcome { job, result: Ok(()) }) => {
                    trace!(job, "job outcome collected");
                    report.completed += 1;
                }
                Ok(JobOutcome {
                    job,
                    result: Err(e),
                }) => {
                    warn!(job, error = %e, "job failed");
                    report.failures.push((job, e));
                }
                // The job task itself only awaits; the body runs in its own
                // task. Reaching this means the runtime is shutting down.
                Err(e) => {
                    warn!(error = %e, "job task aborted");
                    report.failures.push((0, JobError::Panicked(e.to_string())));
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            completed = report.completed,
            failed = report.failed(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "all jobs done"
        );

        report
    }
}

/// Everything one job task needs, moved into the task.
struct JobTask<E> {
    pool: Arc<WorkerPool>,
    gate: Arc<Semaphore>,
    executor: Arc<E>,
    metrics: Option<Arc<Metrics>>,
    job_timeout: Option<Duration>,
}

impl<E> JobTask<E>
where
    E: JobExecutor + 'static,
{
    async fn run(self, job: Job) -> JobOutcome {
        let result = self.drive(job).await;
        debug!(job = job.id, state = %JobState::Done, "job done");

        if let Some(ref metrics) = self.metrics {
            metrics.update_worker_metrics(self.pool.in_use(), self.pool.size());
        }

        JobOutcome {
            job: job.id,
            result,
        }
    }

    async fn drive(&self, job: Job) -> Result<(), JobError> {
        trace!(job = job.id, state = %JobState::Pending, "job queued");

        // Acquiring: the condvar wait blocks a thread, so keep it off the
        // runtime workers. The gate bounds how many threads do that at once.
        debug!(job = job.id, state = %JobState::Acquiring, "waiting for a worker");
        let wait_started = Instant::now();
        if let Some(ref metrics) = self.metrics {
            metrics.acquire_waiting.inc();
        }
        let acquired = self.acquire().await;
        if let Some(ref metrics) = self.metrics {
            metrics.acquire_waiting.dec();
        }
        let (permit, guard) = acquired?;
        let worker = guard.id();

        if let Some(ref metrics) = self.metrics {
            metrics.record_acquire_wait(wait_started.elapsed().as_secs_f64());
            metrics.update_worker_metrics(self.pool.in_use(), self.pool.size());
        }

        // Running: the body gets its own task so a panic surfaces as a
        // JoinError here instead of unwinding past the guard.
        debug!(worker, job = job.id, state = %JobState::Running, "job running");
        let run_started = Instant::now();
        let executor = Arc::clone(&self.executor);
        let mut body = tokio::spawn(async move { executor.execute(worker, &job).await });

        let result = match self.job_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut body).await {
                Ok(joined) => flatten(joined),
                Err(_) => {
                    // Abort only lands at the body's next yield; the worker
                    // stays held until the body is really gone.
                    body.abort();
                    let _ = (&mut body).await;
                    Err(JobError::Execution(ExecutorError::timeout(limit)))
                }
            },
            None => flatten(body.await),
        };
        let ran_for = run_started.elapsed();

        // Releasing: always, whatever the body did.
        debug!(worker, job = job.id, state = %JobState::Releasing, "releasing worker");
        let released = guard.release();
        drop(permit);

        if let Some(ref metrics) = self.metrics {
            metrics.record_job(result.is_ok(), ran_for.as_secs_f64());
        }

        released?;
        result
    }

    /// Wait for a gate permit, then for a pooled worker.
    async fn acquire(
        &self,
    ) -> Result<(OwnedSemaphorePermit, WorkerGuard<Arc<WorkerPool>>), JobError> {
        let permit = Arc::clone(&self.gate)
            .acquire_owned()
            .await
            .map_err(|_| JobError::Pool(PoolError::Shutdown))?;

        let pool = Arc::clone(&self.pool);
        match tokio::task::spawn_blocking(move || pool.acquire_owned()).await {
            Ok(Ok(guard)) => Ok((permit, guard)),
            Ok(Err(e)) => Err(JobError::Pool(e)),
            Err(e) => Err(JobError::Panicked(e.to_string())),
        }
    }
}

fn flatten(
    joined: Result<Result<(), ExecutorError>, tokio::task::JoinError>,
) -> Result<(), JobError> {
    match joined {
        Ok(result) => result.map_err(JobError::Execution),
        Err(e) if e.is_panic() => Err(JobError::Panicked(panic_message(e.into_panic()))),
        Err(e) => Err(JobError::Panicked(e.to_string())),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
