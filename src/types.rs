//! Core value types shared by the pool, dispatcher and executors.

use std::fmt;
use std::time::Duration;

/// Job identifier (1-based, assigned at generation time).
pub type JobId = u64;

/// Worker identifier (1-based slot index in the pool arena).
pub type WorkerId = usize;

// =============================================================================
// Job
// =============================================================================

/// An independent unit of work.
///
/// Jobs are created in bulk before dispatch and are read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Job {
    /// Job id
    pub id: JobId,
    /// Simulated workload length
    pub duration: Duration,
}

impl Job {
    #[inline]
    pub fn new(id: JobId, duration: Duration) -> Self {
        Self { id, duration }
    }

    /// Job with no workload, completes as soon as it runs.
    #[inline]
    pub fn instant(id: JobId) -> Self {
        Self::new(id, Duration::ZERO)
    }

    /// Duration in fractional seconds, as printed in narration lines.
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job {} ({}s)", self.id, self.duration_secs())
    }
}

// =============================================================================
// Job State
// =============================================================================

/// Lifecycle of a single dispatched job.
///
/// `Done` is entered exactly once per job, whether the body succeeded or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Acquiring,
    Running,
    Releasing,
    Done,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Acquiring => "acquiring",
            JobState::Running => "running",
            JobState::Releasing => "releasing",
            JobState::Done => "done",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
