//! Random job generation for the command-line runner.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{Job, JobId};

/// Default duration range, in units.
pub const DEFAULT_UNITS: RangeInclusive<u32> = 1..=6;

/// Builds jobs with ids `1..=count` and random durations.
///
/// Each duration is `unit * k` with `k` drawn uniformly from `units`.
pub struct JobGenerator {
    units: RangeInclusive<u32>,
    unit: Duration,
    rng: StdRng,
}

impl JobGenerator {
    /// Generator seeded from the OS.
    pub fn new(units: RangeInclusive<u32>, unit: Duration) -> Self {
        Self {
            units,
            unit,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible generator.
    pub fn seeded(units: RangeInclusive<u32>, unit: Duration, seed: u64) -> Self {
        Self {
            units,
            unit,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate `count` jobs.
    pub fn generate(&mut self, count: usize) -> Vec<Job> {
        (1..=count as JobId)
            .map(|id| {
                let k = self.rng.gen_range(self.units.clone());
                Job::new(id, self.unit * k)
            })
            .collect()
    }
}

impl Default for JobGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_UNITS, Duration::from_secs(1))
    }
}
