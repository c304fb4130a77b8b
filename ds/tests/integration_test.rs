//! Integration tests for DealScout
//!
//! These tests drive the batch runner, poller, and config loading
//! through the public library API, and smoke-test the `ds` binary.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use assert_cmd::Command;
use async_trait::async_trait;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

use dealscout::batch;
use dealscout::cli::OutputFormat;
use dealscout::config::{API_URL_ENV, Config};
use dealscout::poller::{JobPoller, PollEvent};
use scoutapi::{
    AnalysisApi, AnalysisResult, ApiError, ApiStatus, JobResponse, JobStatusResponse, ResultMetrics, StepRecord,
    SummaryResponse,
};

const INTERVAL: Duration = Duration::from_millis(5);

// =============================================================================
// Scripted backend
// =============================================================================

/// [`AnalysisApi`] that replays canned job snapshots in order.
struct ScriptedBackend {
    statuses: Vec<Result<JobStatusResponse, String>>,
    poll_calls: AtomicUsize,
    fail_start: bool,
}

impl ScriptedBackend {
    fn new(statuses: Vec<Result<JobStatusResponse, String>>) -> Self {
        Self {
            statuses,
            poll_calls: AtomicUsize::new(0),
            fail_start: false,
        }
    }

    fn failing_start() -> Self {
        let mut backend = Self::new(Vec::new());
        backend.fail_start = true;
        backend
    }

    fn poll_calls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisApi for ScriptedBackend {
    async fn ping(&self) -> Result<ApiStatus, ApiError> {
        Ok(ApiStatus {
            message: "Welcome to Data Driven VC API".to_string(),
        })
    }

    async fn start_analysis(&self, _domain: &str) -> Result<JobResponse, ApiError> {
        if self.fail_start {
            return Err(ApiError::Api {
                status: 503,
                message: "backend is down for maintenance".to_string(),
            });
        }
        Ok(JobResponse {
            job_id: "job-42".to_string(),
        })
    }

    async fn job_status(&self, _job_id: &str) -> Result<JobStatusResponse, ApiError> {
        let call = self.poll_calls.fetch_add(1, Ordering::SeqCst);
        match self.statuses.get(call) {
            Some(Ok(status)) => Ok(status.clone()),
            Some(Err(message)) => Err(ApiError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Err(ApiError::InvalidResponse("no more scripted statuses".to_string())),
        }
    }

    async fn summarize_step(&self, _step: &StepRecord) -> Result<SummaryResponse, ApiError> {
        Ok(SummaryResponse {
            summary: "- scripted summary".to_string(),
        })
    }
}

fn running(status: &str, steps_done: u32) -> JobStatusResponse {
    JobStatusResponse {
        status: status.to_string(),
        completed: false,
        result: None,
        current_step_data: None,
        step_history: (1..=steps_done)
            .map(|step| StepRecord {
                step,
                ..Default::default()
            })
            .collect(),
    }
}

fn completed(domain: &str, steps_done: u32) -> JobStatusResponse {
    let mut snapshot = running("Generating final report...", steps_done);
    snapshot.completed = true;
    snapshot.result = Some(AnalysisResult {
        domain: domain.to_string(),
        analyzed_at: "2025-06-02T11:40:12.003411".to_string(),
        metrics: ResultMetrics {
            score: 92.0,
            potential: "High".to_string(),
            market_size: "$100M-$1B".to_string(),
            company_age: "7 years".to_string(),
            market_position: "Leader".to_string(),
            recommendation: "Buy".to_string(),
        },
    });
    snapshot
}

// =============================================================================
// Batch Analysis Tests
// =============================================================================

#[tokio::test]
async fn test_batch_analysis_end_to_end() {
    let api = Arc::new(ScriptedBackend::new(vec![
        Ok(running("Verifying company existence...", 1)),
        Ok(running("Analyzing market position...", 3)),
        Ok(completed("stripe.com", 5)),
    ]));

    let mut out = Vec::new();
    batch::run_analysis(
        api.clone(),
        "https://www.stripe.com/about",
        OutputFormat::Text,
        INTERVAL,
        &mut out,
    )
    .await
    .expect("analysis should run to completion");

    let text = String::from_utf8(out).expect("output should be UTF-8");
    // URL input reduced to the bare domain before submission
    assert!(text.contains("Analyzing stripe.com"), "got: {text}");
    assert!(text.contains("Step 1:"));
    assert!(text.contains("Step 5:"));
    assert!(text.contains("✓ Analysis complete (5 steps)"));
    assert!(text.contains("Final Analysis for stripe.com"));
    assert!(text.contains("Overall Score    92"));
    assert!(text.contains("Recommendation   Buy"));
    // Polling stopped at the completed snapshot
    assert_eq!(api.poll_calls(), 3);
}

#[tokio::test]
async fn test_batch_json_output_parses() {
    let api = Arc::new(ScriptedBackend::new(vec![
        Ok(running("Verifying company existence...", 1)),
        Ok(completed("stripe.com", 5)),
    ]));

    let mut out = Vec::new();
    batch::run_analysis(api, "stripe.com", OutputFormat::Json, INTERVAL, &mut out)
        .await
        .expect("analysis should run to completion");

    // Progress lines are suppressed: the whole output is one document
    let value: serde_json::Value = serde_json::from_slice(&out).expect("output should be valid JSON");
    assert_eq!(value["domain"], "stripe.com");
    assert_eq!(value["metrics"]["score"], 92.0);
    assert_eq!(value["metrics"]["recommendation"], "Buy");
}

#[tokio::test]
async fn test_batch_reports_submission_failure() {
    let api = Arc::new(ScriptedBackend::failing_start());

    let mut out = Vec::new();
    let err = batch::run_analysis(api, "stripe.com", OutputFormat::Text, INTERVAL, &mut out)
        .await
        .expect_err("submission failure should error");

    assert_eq!(err.to_string(), "Failed to start analysis. Please try again.");
}

#[tokio::test]
async fn test_batch_reports_poll_failure() {
    let api = Arc::new(ScriptedBackend::new(vec![
        Ok(running("Verifying company existence...", 1)),
        Err("gateway timeout".to_string()),
    ]));

    let mut out = Vec::new();
    let err = batch::run_analysis(api, "stripe.com", OutputFormat::Text, INTERVAL, &mut out)
        .await
        .expect_err("poll failure should error");

    assert_eq!(err.to_string(), "Failed to get job status");
}

// =============================================================================
// Job Poller Tests
// =============================================================================

#[tokio::test]
async fn test_poller_emits_until_complete_then_closes() {
    let api = Arc::new(ScriptedBackend::new(vec![
        Ok(running("Verifying company existence...", 1)),
        Ok(running("Analyzing market position...", 2)),
        Ok(completed("stripe.com", 4)),
    ]));

    let mut poller = JobPoller::spawn(api.clone(), "job-42".to_string(), INTERVAL);

    let mut snapshots = Vec::new();
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(event) = poller.recv().await {
            match event {
                PollEvent::Status(status) => snapshots.push(status),
                PollEvent::Failed(message) => panic!("unexpected poll failure: {message}"),
            }
        }
    })
    .await;
    assert!(drained.is_ok(), "Poller should finish well before the timeout");

    assert_eq!(snapshots.len(), 3);
    assert!(snapshots[2].completed);
    // The task stopped at completion rather than draining the script
    assert_eq!(api.poll_calls(), 3);
}

#[tokio::test]
async fn test_dropping_poller_stops_polling() {
    // Script far more snapshots than we consume
    let statuses = (0..100).map(|i| Ok(running("Working...", i))).collect();
    let api = Arc::new(ScriptedBackend::new(statuses));

    let mut poller = JobPoller::spawn(api.clone(), "job-42".to_string(), INTERVAL);
    let first = poller.recv().await;
    assert!(matches!(first, Some(PollEvent::Status(_))));
    drop(poller);

    // At most one in-flight poll can land after the drop
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(api.poll_calls() <= 2, "polling kept running after drop: {}", api.poll_calls());
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
#[serial]
fn test_config_file_drives_client_settings() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("dealscout.yml");
    std::fs::write(
        &path,
        "api:\n  base-url: \"http://scout.internal:9000\"\n  timeout-secs: 5\npoll:\n  interval-ms: 200\nlog-level: debug\n",
    )
    .expect("Failed to write config");

    // The pre-logging peek and the full load agree on the same file
    let level = Config::load_log_level(Some(&path));
    assert_eq!(level.as_deref(), Some("debug"));

    let config = Config::load(Some(&path)).expect("Failed to load config");
    assert_eq!(config.api.base_url, "http://scout.internal:9000");
    assert_eq!(config.api.timeout(), Duration::from_secs(5));
    assert_eq!(config.poll.interval(), Duration::from_millis(200));
}

// =============================================================================
// CLI Binary Tests
// =============================================================================

fn ds() -> Command {
    Command::cargo_bin("ds").expect("ds binary")
}

#[test]
fn test_help_lists_commands() {
    ds().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyze acquisition targets by company domain"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("ping"))
        .stdout(predicate::str::contains("logs"))
        .stdout(predicate::str::contains(API_URL_ENV));
}

#[test]
fn test_version_runs() {
    ds().arg("--version").assert().success().stdout(predicate::str::contains("ds"));
}

#[test]
fn test_analyze_requires_a_domain() {
    ds().arg("analyze")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DOMAIN"));
}

#[test]
fn test_analyze_rejects_unknown_format() {
    ds().args(["analyze", "stripe.com", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}

#[test]
fn test_analyze_reports_unreachable_backend() {
    ds().env(API_URL_ENV, "http://127.0.0.1:9")
        .args(["analyze", "stripe.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to start analysis"));
}

#[test]
fn test_ping_reports_unreachable_backend() {
    ds().env(API_URL_ENV, "http://127.0.0.1:9")
        .arg("ping")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Backend is not responding"));
}

#[test]
fn test_logs_runs_without_a_tty() {
    ds().arg("logs").assert().success();
}
