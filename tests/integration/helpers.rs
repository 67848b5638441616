//! Test helpers and utilities

use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use worker_team::{ExecutorError, Job, JobExecutor, JobId, WorkerId};

/// One observed event of an instrumented job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Started { worker: WorkerId, job: JobId },
    Finished { worker: WorkerId, job: JobId },
}

/// Executor that sleeps like the real one but records every start/finish
/// and the highest number of jobs running at once.
#[derive(Default)]
pub struct Probe {
    running: AtomicUsize,
    peak: AtomicUsize,
    events: Mutex<Vec<Event>>,
}

#[allow(dead_code)]
impl Probe {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobExecutor for Probe {
    async fn execute(&self, worker: WorkerId, job: &Job) -> Result<(), ExecutorError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(Event::Started { worker, job: job.id });

        tokio::time::sleep(job.duration).await;

        self.events
            .lock()
            .unwrap()
            .push(Event::Finished { worker, job: job.id });
        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "probe"
    }
}

/// Jobs `1..=count`, each taking `millis`.
#[allow(dead_code)]
pub fn jobs(count: u64, millis: u64) -> Vec<Job> {
    (1..=count)
        .map(|id| Job::new(id, Duration::from_millis(millis)))
        .collect()
}

/// Run the binary with `args`, a 1ms job unit and plain-text logs.
#[allow(dead_code)]
pub fn run_cli(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_worker_team"));
    cmd.args(args)
        .env_remove("RUST_LOG")
        .env_remove("LOG_LEVEL")
        .env("JOB_UNIT", "1ms")
        .env("LOG_FORMAT", "text")
        .env("NO_COLOR", "1");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("failed to run worker_team binary")
}
