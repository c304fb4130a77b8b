//! Reqwest-backed implementation of [`AnalysisApi`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::AnalysisApi;
use crate::error::ApiError;
use crate::types::{AnalyzeRequest, ApiStatus, JobResponse, JobStatusResponse, StepRecord, StepSummaryRequest, SummaryResponse};

/// HTTP client for the analysis backend.
///
/// Thin by intent: one request per call, no retry, no backoff. A failed
/// poll is surfaced to the caller, which stops polling.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAnalysisClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "read_json: API error");
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        let body = response.text().await.map_err(ApiError::Network)?;
        decode_body(&body)
    }
}

/// Decode a success body, surfacing shape mismatches as
/// [`ApiError::InvalidResponse`]
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn ping(&self) -> Result<ApiStatus, ApiError> {
        debug!("HttpAnalysisClient::ping: called");
        let response = self.http.get(self.endpoint("/")).send().await?;
        Self::read_json(response).await
    }

    async fn start_analysis(&self, domain: &str) -> Result<JobResponse, ApiError> {
        debug!(domain, "HttpAnalysisClient::start_analysis: called");
        let body = AnalyzeRequest {
            domain: domain.to_string(),
        };
        let response = self.http.post(self.endpoint("/analyze-domain")).json(&body).send().await?;
        Self::read_json(response).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError> {
        debug!(job_id, "HttpAnalysisClient::job_status: called");
        let response = self.http.get(self.endpoint(&format!("/job/{job_id}"))).send().await?;
        Self::read_json(response).await
    }

    async fn summarize_step(&self, step: &StepRecord) -> Result<SummaryResponse, ApiError> {
        debug!(step = step.step, "HttpAnalysisClient::summarize_step: called");
        let body = StepSummaryRequest {
            step_data: step.clone(),
        };
        let response = self.http.post(self.endpoint("/summarize-step")).json(&body).send().await?;
        Self::read_json(response).await
    }
}
