//! Run configuration: job and worker counts from the command line.

use std::num::NonZeroUsize;

use super::parse::parse_value;
use super::ConfigError;

/// Usage line printed on argument errors.
pub const USAGE: &str = "usage: worker_team <jobs> <workers|auto>";

const JOBS_ARG: &str = "<jobs>";
const WORKERS_ARG: &str = "<workers>";

/// What to run: how many jobs, on how many workers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of jobs to generate (may be zero).
    pub jobs: usize,
    /// Resolved worker count (never zero).
    workers: NonZeroUsize,
}

impl RunConfig {
    pub fn new(jobs: usize, workers: NonZeroUsize) -> Self {
        Self { jobs, workers }
    }

    /// Parse positional arguments (program name already stripped).
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();

        let jobs = match args.next() {
            Some(raw) => parse_value::<usize>(JOBS_ARG, raw.as_ref())?,
            None => {
                return Err(ConfigError::Missing {
                    key: JOBS_ARG.into(),
                })
            }
        };

        let workers = match args.next() {
            Some(raw) => Self::parse_workers(raw.as_ref())?,
            None => {
                return Err(ConfigError::Missing {
                    key: WORKERS_ARG.into(),
                })
            }
        };

        if let Some(extra) = args.next() {
            return Err(ConfigError::Invalid {
                key: "<args>".into(),
                message: format!("unexpected extra argument '{}'", extra.as_ref()),
            });
        }

        Ok(Self { jobs, workers })
    }

    /// Get worker count (pre-computed, zero-cost).
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.get()
    }

    fn parse_workers(raw: &str) -> Result<NonZeroUsize, ConfigError> {
        // "auto" resolves to CPU count
        let count = if raw.trim().eq_ignore_ascii_case("auto") {
            num_cpus::get()
        } else {
            parse_value::<usize>(WORKERS_ARG, raw)?
        };

        NonZeroUsize::new(count).ok_or_else(|| ConfigError::Invalid {
            key: WORKERS_ARG.into(),
            message: "worker count cannot be zero".into(),
        })
    }
}
