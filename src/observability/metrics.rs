//! Prometheus metrics for worker_team.
//!
//! Tracks pool occupancy, how long jobs wait for a worker, and job outcomes.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Prometheus metrics registry with all application metrics.
pub struct Metrics {
    registry: Registry,

    // === Pool Metrics ===
    /// Total workers count
    pub workers_total: Gauge,

    /// Busy workers count
    pub workers_busy: Gauge,

    /// Jobs blocked waiting for a worker
    pub acquire_waiting: Gauge,

    /// Time spent waiting for a worker, in seconds
    pub acquire_wait_seconds: Histogram,

    // === Job Metrics ===
    /// Finished jobs by status (success, failed)
    pub jobs_total: IntCounterVec,

    /// Job body duration in seconds (worker held)
    pub job_duration_seconds: Histogram,
}

impl Metrics {
    /// Create a new metrics registry with all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Waits range from "free worker" to "queued behind several jobs"
        let wait_buckets = vec![
            0.0001, 0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ];

        // Simulated jobs run for whole units (1-6s by default)
        let job_buckets = vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 10.0];

        let workers_total = Gauge::new("worker_team_workers_total", "Total workers in the pool")?;
        registry.register(Box::new(workers_total.clone()))?;

        let workers_busy = Gauge::new("worker_team_workers_busy", "Workers currently held")?;
        registry.register(Box::new(workers_busy.clone()))?;

        let acquire_waiting = Gauge::new(
            "worker_team_acquire_waiting",
            "Jobs blocked waiting for a worker",
        )?;
        registry.register(Box::new(acquire_waiting.clone()))?;

        let acquire_wait_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "worker_team_acquire_wait_seconds",
                "Time a job waited for a free worker",
            )
            .buckets(wait_buckets),
        )?;
        registry.register(Box::new(acquire_wait_seconds.clone()))?;

        let jobs_total = IntCounterVec::new(
            Opts::new("worker_team_jobs_total", "Finished jobs by status"),
            &["status"],
        )?;
        registry.register(Box::new(jobs_total.clone()))?;

        let job_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "worker_team_job_duration_seconds",
                "Time a job held its worker",
            )
            .buckets(job_buckets),
        )?;
        registry.register(Box::new(job_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            workers_total,
            workers_busy,
            acquire_waiting,
            acquire_wait_seconds,
            jobs_total,
            job_duration_seconds,
        })
    }

    /// Update worker metrics.
    pub fn update_worker_metrics(&self, busy: usize, total: usize) {
        self.workers_busy.set(busy as f64);
        self.workers_total.set(total as f64);
    }

    /// Record how long a job waited before it got a worker.
    pub fn record_acquire_wait(&self, wait_secs: f64) {
        self.acquire_wait_seconds.observe(wait_secs);
    }

    /// Record a finished job.
    pub fn record_job(&self, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "failed" };
        self.jobs_total.with_label_values(&[status]).inc();
        self.job_duration_seconds.observe(duration_secs);
    }

    /// Number of finished jobs with the given status.
    pub fn jobs_with_status(&self, status: &str) -> u64 {
        self.jobs_total.with_label_values(&[status]).get()
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Get the Prometheus registry (for custom metrics).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Should create metrics");
        metrics.update_worker_metrics(0, 4);
        assert!(metrics.export().contains("# HELP worker_team_workers_total"));
    }

    #[test]
    fn test_job_recording() {
        let metrics = Metrics::new().expect("Should create metrics");
        metrics.record_job(true, 1.0);
        metrics.record_job(true, 2.0);
        metrics.record_job(false, 0.5);

        assert_eq!(metrics.jobs_with_status("success"), 2);
        assert_eq!(metrics.jobs_with_status("failed"), 1);

        let output = metrics.export();
        assert!(output.contains("worker_team_jobs_total"));
        assert!(output.contains("status=\"success\""));
    }

    #[test]
    fn test_custom_metric_on_shared_registry() {
        let metrics = Metrics::new().expect("Should create metrics");
        let retries = prometheus::IntCounter::new("worker_team_retries_total", "Job retries")
            .expect("Should create counter");
        metrics
            .registry()
            .register(Box::new(retries.clone()))
            .expect("Should register counter");

        retries.inc_by(2);

        assert!(metrics.export().contains("worker_team_retries_total 2"));
    }

    #[test]
    fn test_worker_gauges() {
        let metrics = Metrics::new().expect("Should create metrics");
        metrics.update_worker_metrics(3, 4);

        assert_eq!(metrics.workers_busy.get(), 3.0);
        assert_eq!(metrics.workers_total.get(), 4.0);
    }
}
