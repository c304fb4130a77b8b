//! Client trait for the analysis API.
//!
//! Everything that talks to the backend goes through [`AnalysisApi`] so
//! the polling loop, batch runner, and TUI can be driven by a scripted
//! implementation in tests.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{ApiStatus, JobResponse, JobStatusResponse, StepRecord, SummaryResponse};

/// Async interface to the deal-scout backend.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// `GET /`: liveness check.
    async fn ping(&self) -> Result<ApiStatus, ApiError>;

    /// `POST /analyze-domain`: submit a domain, receive a job id to poll.
    async fn start_analysis(&self, domain: &str) -> Result<JobResponse, ApiError>;

    /// `GET /job/{job_id}`: snapshot of a running or finished job.
    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError>;

    /// `POST /summarize-step`: LLM-written summary of one step record.
    async fn summarize_step(&self, step: &StepRecord) -> Result<SummaryResponse, ApiError>;
}

/// Mock client for testing.
#[cfg(test)]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Scripted [`AnalysisApi`]: returns canned status snapshots in order,
    /// then errors once the script runs out.
    pub struct MockAnalysisApi {
        pub job_id: String,
        statuses: Vec<JobStatusResponse>,
        poll_calls: AtomicUsize,
        summaries: Vec<String>,
        summary_calls: AtomicUsize,
        fail_start: bool,
    }

    impl MockAnalysisApi {
        pub fn new(statuses: Vec<JobStatusResponse>) -> Self {
            Self {
                job_id: "job-1".to_string(),
                statuses,
                poll_calls: AtomicUsize::new(0),
                summaries: Vec::new(),
                summary_calls: AtomicUsize::new(0),
                fail_start: false,
            }
        }

        /// Script the summaries returned by `summarize_step`, in order.
        pub fn with_summaries(mut self, summaries: Vec<String>) -> Self {
            self.summaries = summaries;
            self
        }

        /// Make `start_analysis` fail with a backend error.
        pub fn failing_start() -> Self {
            let mut mock = Self::new(Vec::new());
            mock.fail_start = true;
            mock
        }

        pub fn poll_calls(&self) -> usize {
            self.poll_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalysisApi for MockAnalysisApi {
        async fn ping(&self) -> Result<ApiStatus, ApiError> {
            Ok(ApiStatus {
                message: "Welcome to Data Driven VC API".to_string(),
            })
        }

        async fn start_analysis(&self, _domain: &str) -> Result<JobResponse, ApiError> {
            if self.fail_start {
                return Err(ApiError::Api {
                    status: 500,
                    message: "mock start failure".to_string(),
                });
            }
            Ok(JobResponse {
                job_id: self.job_id.clone(),
            })
        }

        async fn job_status(&self, _job_id: &str) -> Result<JobStatusResponse, ApiError> {
            let call = self.poll_calls.fetch_add(1, Ordering::SeqCst);
            self.statuses
                .get(call)
                .cloned()
                .ok_or_else(|| ApiError::InvalidResponse("no more scripted statuses".to_string()))
        }

        async fn summarize_step(&self, _step: &StepRecord) -> Result<SummaryResponse, ApiError> {
            let call = self.summary_calls.fetch_add(1, Ordering::SeqCst);
            self.summaries
                .get(call)
                .cloned()
                .map(|summary| SummaryResponse { summary })
                .ok_or_else(|| ApiError::InvalidResponse("no more scripted summaries".to_string()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn snapshot(status: &str, completed: bool) -> JobStatusResponse {
            JobStatusResponse {
                status: status.to_string(),
                completed,
                result: None,
                current_step_data: None,
                step_history: Vec::new(),
            }
        }

        #[tokio::test]
        async fn test_mock_returns_statuses_in_order() {
            let mock = MockAnalysisApi::new(vec![
                snapshot("Verifying company existence...", false),
                snapshot("Generating final report...", true),
            ]);

            let first = mock.job_status("job-1").await.unwrap();
            assert_eq!(first.status, "Verifying company existence...");
            let second = mock.job_status("job-1").await.unwrap();
            assert!(second.completed);
            assert_eq!(mock.poll_calls(), 2);
        }

        #[tokio::test]
        async fn test_mock_errors_when_script_runs_out() {
            let mock = MockAnalysisApi::new(vec![]);
            let result = mock.job_status("job-1").await;
            assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
        }

        #[tokio::test]
        async fn test_mock_failing_start() {
            let mock = MockAnalysisApi::failing_start();
            let result = mock.start_analysis("acme.io").await;
            assert!(matches!(result, Err(ApiError::Api { status: 500, .. })));
        }

        #[tokio::test]
        async fn test_mock_summaries() {
            let mock = MockAnalysisApi::new(vec![]).with_summaries(vec!["tight summary".to_string()]);
            let step = StepRecord::default();
            let response = mock.summarize_step(&step).await.unwrap();
            assert_eq!(response.summary, "tight summary");
            assert!(mock.summarize_step(&step).await.is_err());
        }
    }
}
