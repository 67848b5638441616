//! Observability: Prometheus metrics for the pool and dispatched jobs.
//!
//! # Usage
//!
//! ```rust,ignore
//! use worker_team::observability::Metrics;
//!
//! let metrics = Metrics::new()?;
//! metrics.record_job(true, 2.0);
//! println!("{}", metrics.export());
//! ```

pub mod metrics;

// Re-exports
pub use metrics::Metrics;
