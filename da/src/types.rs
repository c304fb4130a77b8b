//! Wire types shared with the analysis backend.
//!
//! The backend speaks plain JSON: a job submission returns an opaque id,
//! status polls return incremental step records plus an eventual final
//! result, and a step can be sent back for an LLM-written summary.
//!
//! Step records are mostly free-form. The backend annotates them with a
//! few underscore-prefixed presentation hints (`_title`, `_performance`)
//! next to arbitrary analysis fields, so [`StepRecord`] keeps the known
//! keys typed and flattens everything else into an ordered map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Liveness payload from `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStatus {
    pub message: String,
}

/// Body for `POST /analyze-domain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub domain: String,
}

/// Response to a job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub job_id: String,
}

/// Snapshot of a running job from `GET /job/{job_id}`.
///
/// `step_history` grows by one record per pipeline stage; `result` is
/// only present once the backend has finished scoring. A job that died
/// server-side reports `completed` with no result and an error status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub status: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub result: Option<AnalysisResult>,
    #[serde(default)]
    pub current_step_data: Option<StepRecord>,
    #[serde(default)]
    pub step_history: Vec<StepRecord>,
}

impl JobStatusResponse {
    /// True when the job finished without producing a result.
    pub fn failed(&self) -> bool {
        self.completed && self.result.is_none()
    }
}

/// One stage of the analysis pipeline.
///
/// Known annotation keys are typed; every other key lands in `fields`
/// in backend order. Field values are strings (often markdown), numbers,
/// or lists of strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u32,
    #[serde(rename = "_title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "_performance", default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_explanation: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StepRecord {
    /// Title to render: the backend-provided one, else a stock name for
    /// the step number.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) if !title.trim().is_empty() => title.clone(),
            _ => default_step_title(self.step),
        }
    }

    /// Classified performance indicator, if the backend sent one.
    pub fn performance(&self) -> Option<Performance> {
        self.performance.map(Performance::from_indicator)
    }
}

/// Stock titles for the well-known pipeline stages.
pub fn default_step_title(step: u32) -> String {
    match step {
        1 => "Company Verification".to_string(),
        2 => "Market Analysis".to_string(),
        3 => "Financial Assessment".to_string(),
        4 => "Team Analysis".to_string(),
        5 => "Technology Stack".to_string(),
        6 => "Growth Metrics".to_string(),
        7 => "Risk Assessment".to_string(),
        8 => "Market Sentiment".to_string(),
        9 => "Competitive Analysis".to_string(),
        10 => "Final Scoring".to_string(),
        other => format!("Step {other}"),
    }
}

/// Render a free-form field value as display text.
///
/// Strings pass through unquoted (they are frequently markdown), string
/// lists join with commas, everything else falls back to compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Three-way classification of a step's `_performance` indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    Strong,
    Average,
    Weak,
}

impl Performance {
    /// Classify the backend's numeric indicator (nominally -1, 0, or 1).
    pub fn from_indicator(value: f64) -> Self {
        if value > 0.5 {
            Performance::Strong
        } else if value < -0.5 {
            Performance::Weak
        } else {
            Performance::Average
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Performance::Strong => "strong",
            Performance::Average => "average",
            Performance::Weak => "weak",
        }
    }
}

/// Body for `POST /summarize-step`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSummaryRequest {
    pub step_data: StepRecord,
}

/// Response from `POST /summarize-step`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Final scoring summary for an analyzed domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub domain: String,
    pub analyzed_at: String,
    pub metrics: ResultMetrics,
}

/// The six headline metrics of a finished analysis.
///
/// Everything except `score` is a human-readable string straight from
/// the backend ("$1B+", "Leader", "Strong Buy").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetrics {
    pub score: f64,
    pub potential: String,
    pub market_size: String,
    pub company_age: String,
    pub market_position: String,
    pub recommendation: String,
}

impl ResultMetrics {
    /// Score as display text: whole numbers without a trailing `.0`.
    pub fn score_text(&self) -> String {
        if self.score.fract() == 0.0 {
            format!("{:.0}", self.score)
        } else {
            format!("{:.1}", self.score)
        }
    }
}
