//! End-to-end runs of the worker_team binary.

use crate::helpers::run_cli;

#[test]
fn test_runs_jobs_and_narrates() {
    let output = run_cli(&["4", "2"], &[("JOB_SEED", "1")]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout: {}", stdout);
    for job in 1..=4 {
        assert!(stdout.contains(&format!("started the job {} that will take", job)));
        assert!(stdout.contains(&format!("finished the job {} after", job)));
    }
    assert!(stdout.contains("All the work is done!"));
}

#[test]
fn test_zero_jobs_finishes() {
    let output = run_cli(&["0", "3"], &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("All the work is done!"));
    assert!(!stdout.contains("started the job"));
}

#[test]
fn test_missing_arguments_is_usage_error() {
    let output = run_cli(&[], &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("usage: worker_team"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_non_numeric_worker_count_is_usage_error() {
    let output = run_cli(&["3", "lots"], &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("<workers>"));
}

#[test]
fn test_json_logs_carry_worker_and_job() {
    let output = run_cli(&["2", "1"], &[("LOG_FORMAT", "json")]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());

    let started: Vec<serde_json::Value> = stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter(|entry| {
            entry["msg"]
                .as_str()
                .map_or(false, |msg| msg.contains("started the job"))
        })
        .collect();

    assert_eq!(started.len(), 2);
    for entry in started {
        assert_eq!(entry["ctx"]["worker"], 1);
        assert!(entry["ctx"]["job"].is_u64());
    }
}

#[test]
fn test_metrics_dump() {
    let output = run_cli(&["3", "2"], &[("METRICS_DUMP", "1")]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("worker_team_jobs_total{status=\"success\"} 3"));
}
