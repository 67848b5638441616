//! Pool behaviour under real thread contention.

use std::collections::HashSet;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use worker_team::{PoolError, WorkerPool};

#[test]
fn test_no_worker_is_granted_twice() {
    const WORKERS: usize = 4;
    let pool = Arc::new(WorkerPool::new(WORKERS).unwrap());
    let held: Arc<Mutex<HashSet<usize>>> = Arc::default();

    let threads: Vec<_> = (0..16)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let held = Arc::clone(&held);
            thread::spawn(move || {
                for _ in 0..100 {
                    let worker = pool.acquire().unwrap();
                    assert!(
                        held.lock().unwrap().insert(worker.id()),
                        "worker {} handed out while held",
                        worker.id()
                    );
                    assert!(held.lock().unwrap().len() <= WORKERS);

                    held.lock().unwrap().remove(&worker.id());
                    pool.release(worker).unwrap();
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(pool.available(), WORKERS);
}

#[test]
fn test_one_release_wakes_exactly_one_waiter() {
    let pool = Arc::new(WorkerPool::new(1).unwrap());
    let held = pool.acquire().unwrap();

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.acquire_timeout(Duration::from_millis(300)))
        })
        .collect();

    while pool.status().waiting < 3 {
        thread::yield_now();
    }
    pool.release(held).unwrap();

    let results: Vec<_> = waiters.into_iter().map(|w| w.join().unwrap()).collect();
    let granted = results.iter().filter(|r| r.is_ok()).count();
    let timed_out = results
        .iter()
        .filter(|r| matches!(r, Err(PoolError::Timeout(_))))
        .count();

    assert_eq!(granted, 1);
    assert_eq!(timed_out, 2);
    assert_eq!(pool.in_use(), 1);
}

#[test]
fn test_invariant_holds_while_contended() {
    const WORKERS: usize = 2;
    let pool = Arc::new(WorkerPool::new(WORKERS).unwrap());
    let start = Arc::new(Barrier::new(7));

    let workers: Vec<_> = (0..6)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for _ in 0..50 {
                    let guard = pool.acquire_guard().unwrap();
                    thread::sleep(Duration::from_micros(50));
                    drop(guard);
                }
            })
        })
        .collect();

    start.wait();
    for _ in 0..500 {
        let status = pool.status();
        assert_eq!(status.available + status.in_use, WORKERS);
        assert!(status.in_use <= WORKERS);
    }

    for w in workers {
        w.join().unwrap();
    }
    assert_eq!(pool.status().in_use, 0);
}

#[test]
fn test_double_release_does_not_inflate_pool() {
    let pool = WorkerPool::new(2).unwrap();
    let a = pool.acquire().unwrap();
    let _b = pool.acquire().unwrap();

    pool.release(a).unwrap();
    assert!(pool.release(a).unwrap_err().is_misuse());

    // Only the one genuinely released worker can be taken.
    assert!(pool.try_acquire().is_some());
    assert!(pool.try_acquire().is_none());
}
