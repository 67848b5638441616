//! Dispatcher runs against the public API.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use worker_team::jobs::JobGenerator;
use worker_team::observability::Metrics;
use worker_team::{Dispatcher, StubExecutor, WorkerPool};

use crate::helpers::{jobs, Event, Probe};

#[tokio::test]
async fn test_bound_holds_for_many_shapes() {
    for (workers, count) in [(1, 4), (2, 9), (3, 3), (5, 2), (4, 0)] {
        let pool = Arc::new(WorkerPool::new(workers).unwrap());
        let dispatcher = Dispatcher::new(Arc::clone(&pool), Probe::default());

        let report = dispatcher.run_all(jobs(count, 2)).await;

        assert_eq!(report.total, count as usize);
        assert_eq!(report.completed, count as usize);
        assert!(dispatcher.executor().peak() <= workers);
        assert_eq!(pool.available(), workers);
    }
}

#[tokio::test]
async fn test_each_job_starts_before_it_finishes_on_one_worker() {
    let pool = Arc::new(WorkerPool::new(3).unwrap());
    let dispatcher = Dispatcher::new(pool, Probe::default());

    dispatcher.run_all(jobs(12, 3)).await;

    let mut started = HashMap::new();
    let mut busy = HashMap::new();
    for event in dispatcher.executor().events() {
        match event {
            Event::Started { worker, job } => {
                assert!(started.insert(job, worker).is_none(), "job {} ran twice", job);
                assert!(busy.insert(worker, job).is_none(), "worker {} double-booked", worker);
            }
            Event::Finished { worker, job } => {
                assert_eq!(started.get(&job), Some(&worker));
                assert_eq!(busy.remove(&worker), Some(job));
            }
        }
    }
    assert_eq!(started.len(), 12);
    assert!(busy.is_empty());
}

#[tokio::test]
async fn test_single_worker_serializes_three_jobs() {
    let pool = Arc::new(WorkerPool::new(1).unwrap());
    let dispatcher = Dispatcher::new(pool, Probe::default());

    dispatcher.run_all(jobs(3, 2)).await;

    let events = dispatcher.executor().events();
    assert_eq!(events.len(), 6);
    for pair in events.chunks(2) {
        match (pair[0], pair[1]) {
            (Event::Started { job: a, .. }, Event::Finished { job: b, .. }) => assert_eq!(a, b),
            other => panic!("jobs overlapped: {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_enough_workers_means_no_waiting() {
    let pool = Arc::new(WorkerPool::new(6).unwrap());
    let metrics = Arc::new(Metrics::new().unwrap());
    let dispatcher = Dispatcher::new(Arc::clone(&pool), StubExecutor::new())
        .with_metrics(Arc::clone(&metrics));

    let report = dispatcher.run_all(jobs(6, 0)).await;

    assert!(report.is_success());
    assert_eq!(pool.status().contended, 0);
    assert_eq!(metrics.jobs_with_status("success"), 6);
}

#[tokio::test]
async fn test_generated_jobs_run_to_completion() {
    let jobs = JobGenerator::seeded(1..=6, std::time::Duration::from_millis(1), 7).generate(20);
    let pool = Arc::new(WorkerPool::new(4).unwrap());
    let dispatcher = Dispatcher::new(pool, Probe::default());

    let report = dispatcher.run_all(jobs).await;

    assert_eq!(report.completed, 20);
    assert!(dispatcher.executor().peak() <= 4);
}

#[tokio::test]
async fn test_dispatchers_sharing_a_pool_stay_bounded() {
    let pool = Arc::new(WorkerPool::new(2).unwrap());
    let probe = Arc::new(Probe::default());
    let dispatchers: Vec<_> = (0..3)
        .map(|_| Dispatcher::new(Arc::clone(&pool), Arc::clone(&probe)))
        .collect();

    let reports = join_all(dispatchers.iter().map(|d| d.run_all(jobs(4, 2)))).await;

    assert!(reports.iter().all(|r| r.completed == 4 && r.is_success()));
    assert!(probe.peak() <= 2, "peak {} exceeds pool size", probe.peak());
    assert_eq!(probe.events().len(), 24);
    assert_eq!(pool.available(), 2);
}
