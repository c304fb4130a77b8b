//! Error types for the analysis API client.

use thiserror::Error;

/// Errors surfaced by [`AnalysisApi`](crate::client::AnalysisApi) implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// User input could not be normalized into a domain name.
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// Backend replied with a non-success status code.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport failure: connect, timeout, TLS.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Body did not match the expected wire shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Build an [`ApiError::Api`] from a non-success response body.
    ///
    /// FastAPI wraps error messages as `{"detail": "..."}`; unwrap that
    /// when present, otherwise keep the raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| value.get("detail").and_then(|d| d.as_str().map(str::to_string)))
            .unwrap_or_else(|| body.trim().to_string());
        ApiError::Api { status, message }
    }

    /// True when the failure is local input validation, not a backend call.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ApiError::InvalidDomain(_))
    }

    /// HTTP status code, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_unwraps_fastapi_detail() {
        let err = ApiError::from_status(404, r#"{"detail": "Job not found"}"#);
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Job not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_status_keeps_non_json_body() {
        let err = ApiError::from_status(502, "Bad Gateway\n");
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_status_ignores_non_string_detail() {
        // Pydantic validation errors put a list under "detail"
        let err = ApiError::from_status(422, r#"{"detail": [{"loc": ["body", "domain"]}]}"#);
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 422);
                assert!(message.contains("detail"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error (status 500): boom");

        let err = ApiError::InvalidDomain("not a domain".to_string());
        assert_eq!(err.to_string(), "invalid domain: not a domain");
        assert!(err.is_input_error());
    }

    #[test]
    fn test_status_accessor() {
        let err = ApiError::Api {
            status: 404,
            message: "Job not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(ApiError::InvalidResponse("x".to_string()).status(), None);
    }
}
