//! RAII release of acquired workers.

use std::ops::Deref;

use super::error::PoolResult;
use super::slots::{Worker, WorkerPool};
use crate::types::WorkerId;

/// A held worker that goes back to its pool when dropped.
///
/// `P` is either `&WorkerPool` or `Arc<WorkerPool>`. The drop path makes
/// sure a failing or panicking job still returns its worker.
pub struct WorkerGuard<P>
where
    P: Deref<Target = WorkerPool>,
{
    pool: P,
    worker: Option<Worker>,
}

impl<P> WorkerGuard<P>
where
    P: Deref<Target = WorkerPool>,
{
    pub(super) fn new(pool: P, worker: Worker) -> Self {
        Self {
            pool,
            worker: Some(worker),
        }
    }

    /// Id of the held worker.
    pub fn id(&self) -> WorkerId {
        self.worker.map(|w| w.id()).unwrap_or_default()
    }

    /// The underlying handle.
    pub fn worker(&self) -> Option<Worker> {
        self.worker
    }

    /// Release now and report the outcome instead of logging it on drop.
    pub fn release(mut self) -> PoolResult<()> {
        match self.worker.take() {
            Some(worker) => self.pool.release(worker),
            None => Ok(()),
        }
    }
}

impl<P> Drop for WorkerGuard<P>
where
    P: Deref<Target = WorkerPool>,
{
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            if let Err(e) = self.pool.release(worker) {
                tracing::error!(worker = worker.id(), error = %e, "worker guard release failed");
            }
        }
    }
}

impl<P> std::fmt::Debug for WorkerGuard<P>
where
    P: Deref<Target = WorkerPool>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerGuard")
            .field("worker", &self.worker)
            .finish()
    }
}
