//! Job generation configuration.

use std::ops::RangeInclusive;
use std::time::Duration;

use super::parse::{env_duration, env_opt, env_parse, parse_value};
use super::ConfigError;
use crate::jobs::DEFAULT_UNITS;

/// How jobs are generated and bounded, loaded from environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobsConfig {
    /// Inclusive range of duration units (JOB_MIN_UNITS..=JOB_MAX_UNITS).
    pub units: RangeInclusive<u32>,
    /// Length of one unit (JOB_UNIT).
    pub unit: Duration,
    /// RNG seed for reproducible runs (JOB_SEED).
    pub seed: Option<u64>,
    /// Per-job timeout (JOB_TIMEOUT, "off" disables).
    pub timeout: Option<Duration>,
}

impl JobsConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let min = env_parse("JOB_MIN_UNITS", *DEFAULT_UNITS.start())?;
        let max = env_parse("JOB_MAX_UNITS", *DEFAULT_UNITS.end())?;
        if min > max {
            return Err(ConfigError::Invalid {
                key: "JOB_MIN_UNITS".into(),
                message: format!("minimum {} is above maximum {}", min, max),
            });
        }

        let unit = env_duration("JOB_UNIT", "1s")?.ok_or_else(|| ConfigError::Invalid {
            key: "JOB_UNIT".into(),
            message: "unit cannot be zero".into(),
        })?;

        let seed = match env_opt("JOB_SEED") {
            Some(raw) => Some(parse_value("JOB_SEED", &raw)?),
            None => None,
        };

        Ok(Self {
            units: min..=max,
            unit,
            seed,
            timeout: env_duration("JOB_TIMEOUT", "off")?,
        })
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            units: DEFAULT_UNITS,
            unit: Duration::from_secs(1),
            seed: None,
            timeout: None,
        }
    }
}
