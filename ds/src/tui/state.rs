//! TUI application state

use std::time::{Duration, Instant};

use scoutapi::{AnalysisResult, JobStatusResponse, StepRecord, normalize_domain};
use tracing::debug;

/// Spinner frames for the polling indicator
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Which screen is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Domain entry screen
    #[default]
    Search,
    /// Step progress and final result for one domain
    Analysis,
}

impl View {
    pub fn display_name(&self) -> &'static str {
        match self {
            View::Search => "search",
            View::Analysis => "analysis",
        }
    }
}

/// Interaction mode (modal)
#[derive(Debug, Clone, Default)]
pub enum InteractionMode {
    /// Typing into the domain search box
    #[default]
    Input,
    /// Navigating the analysis view
    Normal,
    /// Confirmation dialog
    Confirm(ConfirmDialog),
    /// Help overlay
    Help,
}

/// Confirmation dialog for actions that lose work
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub message: String,
    pub action: ConfirmAction,
    pub selected_button: bool, // false = No, true = Yes
}

impl ConfirmDialog {
    pub fn new(action: ConfirmAction, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action,
            selected_button: false,
        }
    }

    pub fn quit() -> Self {
        Self::new(ConfirmAction::Quit, "Analysis is still running. Quit anyway?")
    }
}

/// Action to perform on confirm
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    Quit,
}

/// Work queued for the runner to pick up on the next tick
#[derive(Debug, Clone)]
pub enum PendingAction {
    /// Submit a normalized domain for analysis
    Submit(String),
    /// Request a summary for the step card at this index
    Summarize(usize),
    /// Abandon the current analysis and return to search
    Reset,
}

/// One analysis step plus its presentation state.
///
/// The record is replaced wholesale when a fresh snapshot arrives;
/// `expanded` and `summary` survive the merge.
#[derive(Debug, Clone)]
pub struct StepCard {
    pub record: StepRecord,
    pub expanded: bool,
    pub summary: Option<String>,
    pub summarizing: bool,
}

impl StepCard {
    pub fn new(record: StepRecord) -> Self {
        Self {
            record,
            expanded: false,
            summary: None,
            summarizing: false,
        }
    }

    /// Cards with a calculation explanation can fold it open
    pub fn has_explanation(&self) -> bool {
        self.record
            .calculation_explanation
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }

    pub fn toggle_expanded(&mut self) {
        if self.has_explanation() {
            self.expanded = !self.expanded;
        }
    }
}

/// Selection state for the step list
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    pub selected_index: usize,
    pub scroll_offset: usize,
}

impl SelectionState {
    pub fn select_next(&mut self, max_items: usize) {
        if max_items > 0 && self.selected_index < max_items - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self, max_items: usize) {
        if max_items > 0 {
            self.selected_index = max_items - 1;
        }
    }

    /// Ensure selection is within bounds
    pub fn clamp(&mut self, max_items: usize) {
        if max_items == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= max_items {
            self.selected_index = max_items - 1;
        }
    }
}

/// Main TUI application state
#[derive(Debug)]
pub struct AppState {
    /// Current screen
    pub view: View,
    /// Current interaction mode
    pub interaction_mode: InteractionMode,
    /// Should the app quit
    pub should_quit: bool,
    /// Last error message, shown in the footer until the next keypress
    pub error_message: Option<String>,
    /// Backend base URL, shown in the header
    pub api_url: String,

    // === Search screen ===
    /// Domain input buffer
    pub search_input: String,
    /// Submission in flight
    pub submitting: bool,

    // === Active analysis ===
    /// Domain the current analysis was started for
    pub analyzed_domain: Option<String>,
    /// Job id issued by the backend
    pub job_id: Option<String>,
    /// Latest backend status line
    pub job_status: Option<String>,
    /// Is the poller running
    pub polling: bool,
    /// When the job was started (for elapsed display)
    pub started_at: Option<Instant>,
    /// Step cards in pipeline order
    pub steps: Vec<StepCard>,
    /// Final scoring result, once complete
    pub result: Option<AnalysisResult>,
    /// Selection within the step list
    pub steps_selection: SelectionState,

    // === Pending work for the runner ===
    pub pending_action: Option<PendingAction>,

    // === Frame counter driving the spinner ===
    pub tick_count: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: View::default(),
            interaction_mode: InteractionMode::default(),
            should_quit: false,
            error_message: None,
            api_url: String::new(),
            search_input: String::new(),
            submitting: false,
            analyzed_domain: None,
            job_id: None,
            job_status: None,
            polling: false,
            started_at: None,
            steps: Vec::new(),
            result: None,
            steps_selection: SelectionState::default(),
            pending_action: None,
            tick_count: 0,
        }
    }
}

impl AppState {
    /// Create new AppState
    pub fn new() -> Self {
        debug!("AppState::new: called");
        Self::default()
    }

    /// Tick - called on each frame update
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    /// Current spinner frame
    pub fn spinner_frame(&self) -> &'static str {
        SPINNER_FRAMES[(self.tick_count as usize) % SPINNER_FRAMES.len()]
    }

    /// Time since the current job was submitted
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|at| at.elapsed())
    }

    /// Set error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        debug!(%msg, "AppState::set_error: called");
        self.error_message = Some(msg);
    }

    /// Clear error message
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Validate the search box and queue a submission.
    ///
    /// Empty input and input that does not reduce to a domain are
    /// rejected here, before anything reaches the backend.
    pub fn submit_search(&mut self) {
        debug!(input = %self.search_input, "AppState::submit_search: called");
        let trimmed = self.search_input.trim();
        if trimmed.is_empty() {
            self.set_error("Please enter a domain name");
            return;
        }
        match normalize_domain(trimmed) {
            Ok(domain) => self.begin_submit(domain),
            Err(e) => {
                debug!(error = %e, "AppState::submit_search: rejected input");
                self.set_error("Please enter a valid domain name");
            }
        }
    }

    /// Clear any prior analysis and queue a submission for the runner
    fn begin_submit(&mut self, domain: String) {
        debug!(%domain, "AppState::begin_submit: called");
        self.error_message = None;
        self.job_id = None;
        self.job_status = None;
        self.result = None;
        self.steps.clear();
        self.steps_selection = SelectionState::default();
        self.submitting = true;
        self.pending_action = Some(PendingAction::Submit(domain));
    }

    /// The backend accepted the submission: switch to the analysis view
    pub fn start_job(&mut self, domain: String, job_id: String) {
        debug!(%domain, %job_id, "AppState::start_job: called");
        self.submitting = false;
        self.analyzed_domain = Some(domain);
        self.job_id = Some(job_id);
        self.polling = true;
        self.started_at = Some(Instant::now());
        self.view = View::Analysis;
        self.interaction_mode = InteractionMode::Normal;
    }

    /// The submission failed: stay on the search screen
    pub fn submit_failed(&mut self) {
        debug!("AppState::submit_failed: called");
        self.submitting = false;
        self.set_error("Failed to start analysis. Please try again.");
    }

    /// Fold a fresh status snapshot into the step cards.
    ///
    /// Records merge by step number so expansion and summaries survive;
    /// a completed snapshot stops polling and captures the result.
    pub fn apply_status(&mut self, status: JobStatusResponse) {
        debug!(
            status = %status.status,
            completed = status.completed,
            steps = status.step_history.len(),
            "AppState::apply_status: called"
        );
        self.job_status = Some(status.status.clone());

        for record in status.step_history {
            self.merge_step(record);
        }
        if let Some(current) = status.current_step_data {
            self.merge_step(current);
        }
        self.steps_selection.clamp(self.steps.len());

        if status.completed {
            self.polling = false;
            match status.result {
                Some(result) => self.result = Some(result),
                None => {
                    // Job died server-side; its status line carries the reason
                    let message = if status.status.trim().is_empty() {
                        "Analysis failed".to_string()
                    } else {
                        status.status
                    };
                    self.set_error(message);
                }
            }
        }
    }

    fn merge_step(&mut self, record: StepRecord) {
        match self.steps.iter_mut().find(|card| card.record.step == record.step) {
            Some(card) => card.record = record,
            None => {
                self.steps.push(StepCard::new(record));
                self.steps.sort_by_key(|card| card.record.step);
            }
        }
    }

    /// A poll failed: stop and surface the flat error
    pub fn poll_failed(&mut self) {
        debug!("AppState::poll_failed: called");
        self.polling = false;
        self.set_error("Failed to get job status");
    }

    pub fn selected_step(&self) -> Option<&StepCard> {
        self.steps.get(self.steps_selection.selected_index)
    }

    pub fn selected_step_mut(&mut self) -> Option<&mut StepCard> {
        self.steps.get_mut(self.steps_selection.selected_index)
    }

    /// Toggle the calculation-explanation fold on the selected card
    pub fn toggle_selected_expanded(&mut self) {
        if let Some(card) = self.selected_step_mut() {
            card.toggle_expanded();
        }
    }

    /// Queue a summary request for the selected card.
    ///
    /// Only one one-shot request (submit or summarize) runs at a time;
    /// requests made while one is in flight are dropped.
    pub fn request_summary(&mut self) {
        let index = self.steps_selection.selected_index;
        if self.submitting || self.steps.iter().any(|card| card.summarizing) {
            debug!(index, "AppState::request_summary: a request is already in flight");
            return;
        }
        let Some(card) = self.steps.get_mut(index) else {
            return;
        };
        debug!(index, step = card.record.step, "AppState::request_summary: queued");
        card.summarizing = true;
        self.pending_action = Some(PendingAction::Summarize(index));
    }

    /// Store a finished summary on the card with this step number
    pub fn set_summary(&mut self, step: u32, summary: String) {
        debug!(step, "AppState::set_summary: called");
        if let Some(card) = self.steps.iter_mut().find(|card| card.record.step == step) {
            card.summary = Some(summary);
            card.summarizing = false;
        }
    }

    /// A summary request failed
    pub fn summary_failed(&mut self, step: u32) {
        debug!(step, "AppState::summary_failed: called");
        if let Some(card) = self.steps.iter_mut().find(|card| card.record.step == step) {
            card.summarizing = false;
        }
        self.set_error("Failed to generate summary");
    }

    /// Drop the current analysis and return to a clean search screen
    pub fn reset(&mut self) {
        debug!("AppState::reset: called");
        let api_url = std::mem::take(&mut self.api_url);
        *self = Self {
            tick_count: self.tick_count,
            api_url,
            ..Self::default()
        };
    }
}
