//! Typed async client for the deal-scout analysis API.
//!
//! # Core Concepts
//!
//! - **Job**: a server-side analysis task identified by an opaque id,
//!   polled until it reports completion
//! - **Step**: one stage of the analysis pipeline, carrying free-form
//!   key/value findings plus optional title, performance indicator,
//!   and calculation explanation
//! - **Result**: the final six-metric scoring summary for a domain
//!
//! # Modules
//!
//! - `client`: the [`AnalysisApi`] trait every backend client implements
//! - `domain`: normalization of user-entered domain input
//! - `error`: typed API error
//! - `http`: reqwest-backed [`AnalysisApi`] implementation
//! - `types`: wire types shared with the backend

pub mod client;
pub mod domain;
pub mod error;
pub mod http;
pub mod types;

// Re-export the main types for convenience
pub use client::AnalysisApi;
pub use domain::normalize_domain;
pub use error::ApiError;
pub use http::HttpAnalysisClient;
pub use types::{
    AnalysisResult, AnalyzeRequest, ApiStatus, JobResponse, JobStatusResponse, Performance, ResultMetrics,
    StepRecord, StepSummaryRequest, SummaryResponse, value_text,
};
