//! Configuration module for worker_team.
//!
//! Job and worker counts come from the command line; everything else from
//! environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use worker_team::config::Config;
//!
//! let config = Config::load(std::env::args().skip(1))?;
//! println!("Workers: {}", config.run.worker_count());
//! ```

mod error;
mod jobs;
mod logging;
mod parse;
mod run;

pub use error::ConfigError;
pub use jobs::JobsConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::parse_duration;
pub use run::{RunConfig, USAGE};

use parse::env_bool;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Job and worker counts.
    pub run: RunConfig,
    /// Job generation.
    pub jobs: JobsConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Print Prometheus metrics after the run (METRICS_DUMP).
    pub metrics_dump: bool,
}

impl Config {
    /// Load configuration from arguments and environment variables.
    ///
    /// Arguments are checked first so usage errors win over environment
    /// errors.
    pub fn load<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            run: RunConfig::from_args(args)?,
            jobs: JobsConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            metrics_dump: env_bool("METRICS_DUMP", false),
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Jobs: {}", self.run.jobs);
        info!("  Workers: {}", self.run.worker_count());
        info!(
            "  Job duration: {}..={} x {:?}",
            self.jobs.units.start(),
            self.jobs.units.end(),
            self.jobs.unit
        );

        if let Some(seed) = self.jobs.seed {
            info!("  Seed: {}", seed);
        }

        if let Some(timeout) = self.jobs.timeout {
            info!("  Job timeout: {:?}", timeout);
        } else {
            info!("  Job timeout: disabled");
        }

        if self.metrics_dump {
            info!("  Metrics dump: enabled");
        }
    }
}
