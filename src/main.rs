use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use worker_team::config::{Config, USAGE};
use worker_team::jobs::JobGenerator;
use worker_team::observability::Metrics;
use worker_team::{logging, Dispatcher, SleepExecutor, WorkerPool};

fn main() -> ExitCode {
    // Configuration errors abort before any pool activity
    let config = match Config::load(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            if e.is_usage() {
                eprintln!("{}", USAGE);
            }
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!(
        "Starting worker_team {} ({})",
        worker_team::PKG_VERSION,
        worker_team::BUILD_VERSION
    );
    config.log_summary();

    // Jobs only sleep; waiting acquirers live on the blocking pool
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to build runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(config)) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

async fn async_main(config: Config) -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let mut generator = match config.jobs.seed {
        Some(seed) => JobGenerator::seeded(config.jobs.units.clone(), config.jobs.unit, seed),
        None => JobGenerator::new(config.jobs.units.clone(), config.jobs.unit),
    };
    let jobs = generator.generate(config.run.jobs);

    let pool = Arc::new(WorkerPool::new(config.run.worker_count())?);
    let metrics = Arc::new(Metrics::new()?);
    let dispatcher = Dispatcher::new(Arc::clone(&pool), SleepExecutor::new())
        .with_metrics(Arc::clone(&metrics))
        .with_job_timeout(config.jobs.timeout);

    let run = dispatcher.run_all(jobs);
    tokio::pin!(run);

    // Ctrl-C stops handing out workers; running jobs still finish
    let report = tokio::select! {
        report = &mut run => report,
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("Interrupted, letting running jobs finish...");
            pool.close();
            run.await
        }
    };

    if report.is_success() {
        info!("All the work is done!");
    } else {
        warn!(
            failed = report.failed(),
            total = report.total,
            "Work finished with failed jobs"
        );
    }

    if config.metrics_dump {
        print!("{}", metrics.export());
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
