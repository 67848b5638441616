//! Fixed-size worker pool guarded by a mutex and a condition variable.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::error::{PoolError, PoolResult};
use super::guard::WorkerGuard;
use super::PoolStatus;
use crate::types::WorkerId;

/// Handle for one acquisition of a worker.
///
/// The handle is `Copy` so that releasing the same acquisition twice is a
/// detectable runtime error rather than something only the borrow checker
/// can see. Prefer [`WorkerGuard`] when the release should happen on drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Worker {
    id: WorkerId,
    ticket: u64,
}

impl Worker {
    /// Worker id (1-based).
    #[inline]
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Acquisition ticket. Increases every time the slot is handed out.
    #[inline]
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

/// Per-worker bookkeeping in the arena.
#[derive(Debug, Default)]
struct Slot {
    held: bool,
    generation: u64,
}

/// Shared state, only ever touched with the pool lock held.
#[derive(Debug)]
struct PoolState {
    /// Free worker ids, FIFO so released workers go to the back.
    available: VecDeque<WorkerId>,
    /// Slot `i` describes worker `i + 1`.
    slots: Vec<Slot>,
    in_use: usize,
    waiting: usize,
    /// Acquisitions that had to wait at least once.
    contended: u64,
    closed: bool,
}

impl PoolState {
    fn claim(&mut self) -> Option<Worker> {
        let id = self.available.pop_front()?;
        let slot = &mut self.slots[id - 1];
        debug_assert!(!slot.held, "worker {} queued while held", id);
        slot.held = true;
        slot.generation += 1;
        let ticket = slot.generation;

        self.in_use += 1;
        debug_assert_eq!(self.available.len() + self.in_use, self.slots.len());

        Some(Worker { id, ticket })
    }
}

/// A bounded pool of reusable workers.
///
/// At most `size` workers are held at any time. [`acquire`](Self::acquire)
/// blocks the calling thread while every worker is busy and
/// [`release`](Self::release) hands the worker back, waking one waiter.
///
/// The lock is held only for the claim/release bookkeeping, so holders of a
/// worker never serialize each other.
pub struct WorkerPool {
    state: Mutex<PoolState>,
    /// Signalled whenever a worker is returned or the pool closes.
    available_cv: Condvar,
    size: usize,
    /// Pool name for logging.
    name: String,
}

impl WorkerPool {
    /// Create a pool with `size` workers numbered `1..=size`.
    pub fn new(size: usize) -> PoolResult<Self> {
        Self::named(size, "workers")
    }

    /// Create a named pool. The name only shows up in logs.
    pub fn named(size: usize, name: impl Into<String>) -> PoolResult<Self> {
        if size == 0 {
            return Err(PoolError::InvalidSize);
        }

        let name = name.into();
        let state = PoolState {
            available: (1..=size).collect(),
            slots: (0..size).map(|_| Slot::default()).collect(),
            in_use: 0,
            waiting: 0,
            contended: 0,
            closed: false,
        };

        tracing::debug!(pool = %name, workers = size, "worker pool created");

        Ok(Self {
            state: Mutex::new(state),
            available_cv: Condvar::new(),
            size,
            name,
        })
    }

    // No user code runs under the lock, so a poisoned mutex still guards
    // consistent state.
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire a worker, blocking until one is free.
    ///
    /// Fails only with [`PoolError::Shutdown`] once the pool is closed.
    pub fn acquire(&self) -> PoolResult<Worker> {
        let mut state = self.lock();
        let mut waited = false;

        loop {
            if state.closed {
                return Err(PoolError::Shutdown);
            }
            if let Some(worker) = state.claim() {
                if waited {
                    state.contended += 1;
                }
                tracing::trace!(pool = %self.name, worker = worker.id, "worker acquired");
                return Ok(worker);
            }

            // A wake-up only means "look again": another waiter may have
            // claimed the worker first, or the wake may be spurious.
            waited = true;
            state.waiting += 1;
            state = self
                .available_cv
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            state.waiting -= 1;
        }
    }

    /// Acquire a worker, giving up after `timeout`.
    pub fn acquire_timeout(&self, timeout: Duration) -> PoolResult<Worker> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        let mut waited = false;

        loop {
            if state.closed {
                return Err(PoolError::Shutdown);
            }
            // Claim before looking at the clock: a waiter woken by a release
            // right at its deadline must take the worker, not drop the wake.
            if let Some(worker) = state.claim() {
                if waited {
                    state.contended += 1;
                }
                tracing::trace!(pool = %self.name, worker = worker.id, "worker acquired");
                return Ok(worker);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(PoolError::Timeout(timeout));
            }

            waited = true;
            state.waiting += 1;
            let (guard, _) = self
                .available_cv
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
            state.waiting -= 1;
        }
    }

    /// Claim a worker if one is free right now.
    pub fn try_acquire(&self) -> Option<Worker> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        state.claim()
    }

    /// Acquire a worker that is released when the guard drops.
    pub fn acquire_guard(&self) -> PoolResult<WorkerGuard<&Self>> {
        let worker = self.acquire()?;
        Ok(WorkerGuard::new(self, worker))
    }

    /// Like [`acquire_guard`](Self::acquire_guard), but the guard keeps the
    /// pool alive and can move across threads and tasks.
    pub fn acquire_owned(self: &Arc<Self>) -> PoolResult<WorkerGuard<Arc<Self>>> {
        let worker = self.acquire()?;
        Ok(WorkerGuard::new(Arc::clone(self), worker))
    }

    /// Owned guard with a deadline on the wait.
    pub fn acquire_owned_timeout(
        self: &Arc<Self>,
        timeout: Duration,
    ) -> PoolResult<WorkerGuard<Arc<Self>>> {
        let worker = self.acquire_timeout(timeout)?;
        Ok(WorkerGuard::new(Arc::clone(self), worker))
    }

    /// Return a worker to the pool and wake one waiter.
    ///
    /// Releasing a worker the caller does not hold is reported as an error
    /// and leaves the pool untouched.
    pub fn release(&self, worker: Worker) -> PoolResult<()> {
        let mut state = self.lock();

        let index = match worker.id.checked_sub(1).filter(|&i| i < self.size) {
            Some(index) => index,
            None => {
                return Err(self.misuse(PoolError::UnknownWorker {
                    worker: worker.id,
                    size: self.size,
                }));
            }
        };
        let slot = &mut state.slots[index];

        if !slot.held {
            return Err(self.misuse(PoolError::NotHeld(worker.id)));
        }
        if slot.generation != worker.ticket {
            let current = slot.generation;
            return Err(self.misuse(PoolError::StaleRelease {
                worker: worker.id,
                ticket: worker.ticket,
                current,
            }));
        }

        slot.held = false;
        state.in_use -= 1;
        state.available.push_back(worker.id);
        debug_assert_eq!(state.available.len() + state.in_use, self.size);
        drop(state);

        tracing::trace!(pool = %self.name, worker = worker.id, "worker released");
        self.available_cv.notify_one();
        Ok(())
    }

    fn misuse(&self, err: PoolError) -> PoolError {
        tracing::error!(pool = %self.name, error = %err, "invalid worker release");
        err
    }

    /// Close the pool.
    ///
    /// Every blocked and future acquirer gets [`PoolError::Shutdown`].
    /// Workers that are still held can be released normally.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);

        tracing::debug!(pool = %self.name, "worker pool closed");
        self.available_cv.notify_all();
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Consistent snapshot of the pool counters.
    pub fn status(&self) -> PoolStatus {
        let state = self.lock();
        PoolStatus {
            total: self.size,
            available: state.available.len(),
            in_use: state.in_use,
            waiting: state.waiting,
            contended: state.contended,
        }
    }

    /// Total number of workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of workers free right now.
    pub fn available(&self) -> usize {
        self.lock().available.len()
    }

    /// Number of workers currently held.
    pub fn in_use(&self) -> usize {
        self.lock().in_use
    }

    /// Get the pool name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("status", &self.status())
            .finish()
    }
}
