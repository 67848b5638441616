//! Bounded worker pool.
//!
//! All workers are allocated once when the pool is built. Callers borrow the
//! right to use one of them with `acquire` and hand it back with `release`.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      WorkerPool                            │
//! ├────────────────────────────────────────────────────────────┤
//! │  slots:     [ 1 ][ 2 ][ 3 ] ...  (held flag + ticket)      │
//! │  available: VecDeque<WorkerId>   (FIFO of free ids)        │
//! │                      │                                     │
//! │          ┌───────────┴───────────┐                         │
//! │   ┌──────▼──────┐         ┌──────▼──────┐                  │
//! │   │  acquire()  │◀─wait───│   Condvar   │◀─notify_one──┐   │
//! │   └─────────────┘         └─────────────┘              │   │
//! │                                              ┌─────────┴─┐ │
//! │                                              │ release() │ │
//! │                                              └───────────┘ │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every waiter re-checks the available set after waking, so a wake-up never
//! counts as a granted worker on its own.

mod error;
mod guard;
mod slots;

pub use error::{PoolError, PoolResult};
pub use guard::WorkerGuard;
pub use slots::{Worker, WorkerPool};

/// Point-in-time view of the pool counters.
///
/// Read under the pool lock, so `available + in_use == total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of workers in the pool.
    pub total: usize,
    /// Workers free to be acquired.
    pub available: usize,
    /// Workers currently held.
    pub in_use: usize,
    /// Callers blocked in `acquire`.
    pub waiting: usize,
    /// Acquisitions so far that had to wait for a release.
    pub contended: u64,
}

impl PoolStatus {
    /// Returns true when no worker can be acquired without waiting.
    pub fn is_exhausted(&self) -> bool {
        self.available == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_of_fresh_pool() {
        let pool = WorkerPool::new(4).unwrap();
        let status = pool.status();

        assert_eq!(
            status,
            PoolStatus {
                total: 4,
                available: 4,
                in_use: 0,
                waiting: 0,
                contended: 0,
            }
        );
        assert!(!status.is_exhausted());
    }
}
