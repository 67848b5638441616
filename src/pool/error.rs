//! Worker pool error types.

use std::fmt;
use std::time::Duration;

use crate::types::WorkerId;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A pool must own at least one worker.
    InvalidSize,

    /// The worker id is outside the pool's arena.
    UnknownWorker {
        /// Offending worker id.
        worker: WorkerId,
        /// Number of workers in the pool.
        size: usize,
    },

    /// The worker is not currently held (never acquired, or already released).
    NotHeld(WorkerId),

    /// The handle belongs to an earlier acquisition of a worker that has
    /// since been handed to someone else.
    StaleRelease {
        /// Worker id.
        worker: WorkerId,
        /// Ticket carried by the released handle.
        ticket: u64,
        /// Ticket of the current holder.
        current: u64,
    },

    /// No worker became available before the deadline.
    Timeout(Duration),

    /// The pool has been closed.
    Shutdown,
}

impl PoolError {
    /// Check if this is a release of a worker the caller does not hold.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            PoolError::UnknownWorker { .. } | PoolError::NotHeld(_) | PoolError::StaleRelease { .. }
        )
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PoolError::Timeout(_))
    }

    /// Check if this is a shutdown error.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, PoolError::Shutdown)
    }

    /// Get the error message for logging.
    pub fn message(&self) -> &'static str {
        match self {
            PoolError::InvalidSize => "Invalid pool size",
            PoolError::UnknownWorker { .. } => "Unknown worker",
            PoolError::NotHeld(_) => "Worker not held",
            PoolError::StaleRelease { .. } => "Stale release",
            PoolError::Timeout(_) => "Acquire timeout",
            PoolError::Shutdown => "Pool shutdown",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidSize => {
                write!(f, "worker pool needs at least one worker")
            }
            PoolError::UnknownWorker { worker, size } => {
                write!(f, "worker {} does not exist in a pool of {}", worker, size)
            }
            PoolError::NotHeld(worker) => {
                write!(f, "worker {} released but not currently held", worker)
            }
            PoolError::StaleRelease {
                worker,
                ticket,
                current,
            } => {
                write!(
                    f,
                    "worker {} released with stale ticket {} (current holder has {})",
                    worker, ticket, current
                )
            }
            PoolError::Timeout(duration) => {
                write!(f, "no worker available after {}ms", duration.as_millis())
            }
            PoolError::Shutdown => {
                write!(f, "pool has been shut down")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_held_is_misuse() {
        let err = PoolError::NotHeld(3);
        assert!(err.is_misuse());
        assert!(!err.is_timeout());
        assert_eq!(err.message(), "Worker not held");
        assert!(err.to_string().contains("worker 3"));
    }

    #[test]
    fn test_stale_release_display() {
        let err = PoolError::StaleRelease {
            worker: 2,
            ticket: 1,
            current: 4,
        };
        assert!(err.is_misuse());
        assert!(err.to_string().contains("stale ticket 1"));
    }

    #[test]
    fn test_timeout() {
        let err = PoolError::Timeout(Duration::from_millis(250));
        assert!(err.is_timeout());
        assert!(!err.is_misuse());
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn test_shutdown() {
        assert!(PoolError::Shutdown.is_shutdown());
        assert_eq!(PoolError::Shutdown.message(), "Pool shutdown");
    }
}
