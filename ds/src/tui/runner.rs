//! TUI Runner - main loop that owns the terminal and the job poller
//!
//! The TuiRunner is responsible for:
//! - Drawing the UI and dispatching events to App
//! - Spawning background API tasks for submissions and summaries
//! - Owning the JobPoller for the active analysis job

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use scoutapi::AnalysisApi;

use crate::poller::{JobPoller, PollEvent};

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::state::PendingAction;
use super::views;

/// Result from a background API task
#[derive(Debug)]
enum ApiTaskResult {
    /// The backend accepted a submission and issued a job id
    Started { domain: String, job_id: String },
    /// The submission was rejected or unreachable
    SubmitFailed,
    /// A step summary came back
    Summary { step: u32, text: String },
    /// A step summary failed
    SummaryFailed { step: u32 },
}

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    /// Application state
    app: App,
    /// Terminal handle
    terminal: Tui,
    /// Backend API client
    api: Arc<dyn AnalysisApi>,
    /// Event handler
    event_handler: EventHandler,
    /// Poller for the active job, dropped once the job finishes
    poller: Option<JobPoller>,
    /// Poll interval handed to new pollers
    poll_interval: Duration,
    /// Receiver for the in-flight one-shot task's result
    task_rx: Option<mpsc::Receiver<ApiTaskResult>>,
    /// Handle to the in-flight one-shot task (submit or summarize).
    /// At most one runs at a time; aborted on reset and on quit.
    task: Option<JoinHandle<()>>,
}

impl TuiRunner {
    /// Create a new TuiRunner
    pub fn new(
        terminal: Tui,
        api: Arc<dyn AnalysisApi>,
        api_url: String,
        poll_interval: Duration,
        tick_rate: Duration,
    ) -> Self {
        debug!(%api_url, ?poll_interval, ?tick_rate, "TuiRunner::new: called");
        let mut app = App::new();
        app.state_mut().api_url = api_url;

        Self {
            app,
            terminal,
            api,
            event_handler: EventHandler::new(tick_rate),
            poller: None,
            poll_interval,
            task_rx: None,
            task: None,
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: called");
        loop {
            // Draw the UI
            self.terminal.draw(|frame| views::render(self.app.state_mut(), frame))?;

            // Wait for either a terminal event OR poller output
            tokio::select! {
                event = self.event_handler.next() => {
                    match event? {
                        Event::Tick => {
                            self.handle_tick();
                        }
                        Event::Key(key_event) => {
                            if self.app.handle_key(key_event) {
                                break;
                            }
                        }
                        Event::Mouse(mouse_event) => {
                            self.handle_mouse(mouse_event);
                        }
                        Event::Resize(width, height) => {
                            debug!(width, height, "TuiRunner::run: resize");
                        }
                    }
                }
                poll = async {
                    if let Some(poller) = &mut self.poller {
                        poller.recv().await
                    } else {
                        std::future::pending::<Option<PollEvent>>().await
                    }
                } => {
                    match poll {
                        Some(event) => self.handle_poll_event(event),
                        None => {
                            debug!("TuiRunner::run: poller channel closed");
                            self.poller = None;
                        }
                    }
                }
            }

            // Check if we should quit
            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        debug!("TuiRunner::run: exiting");
        self.poller = None;
        self.abort_task();
        Ok(())
    }

    /// Abort the in-flight one-shot task, if any
    fn abort_task(&mut self) {
        if let Some(handle) = self.task.take() {
            debug!("TuiRunner::abort_task: aborting in-flight task");
            handle.abort();
        }
        self.task_rx = None;
    }

    /// Handle tick event - periodic updates
    fn handle_tick(&mut self) {
        self.app.state_mut().tick();

        // Fold in results from background API tasks
        self.process_api_results();

        // Check for pending action (submit/summarize/reset)
        if let Some(action) = self.app.state_mut().pending_action.take() {
            debug!(?action, "TuiRunner::handle_tick: pending action");
            self.execute_action(action);
        }
    }

    /// Handle output from the active job poller
    fn handle_poll_event(&mut self, event: PollEvent) {
        debug!("TuiRunner::handle_poll_event: called");
        match event {
            PollEvent::Status(status) => {
                self.app.state_mut().apply_status(status);
                if !self.app.state().polling {
                    debug!("TuiRunner::handle_poll_event: job finished, dropping poller");
                    self.poller = None;
                }
            }
            PollEvent::Failed(error) => {
                warn!(%error, "TuiRunner::handle_poll_event: polling failed");
                self.app.state_mut().poll_failed();
                self.poller = None;
            }
        }
    }

    /// Process results from the in-flight one-shot task (non-blocking)
    fn process_api_results(&mut self) {
        // Collect first to avoid borrow conflicts
        let Some(rx) = &mut self.task_rx else { return };
        let mut results = Vec::new();
        while let Ok(result) = rx.try_recv() {
            results.push(result);
        }
        if results.is_empty() {
            return;
        }

        // A one-shot task sends exactly one result, then finishes
        self.task_rx = None;
        self.task = None;

        for result in results {
            debug!(?result, "TuiRunner::process_api_results: result");
            match result {
                ApiTaskResult::Started { domain, job_id } => {
                    info!(%domain, %job_id, "TuiRunner::process_api_results: analysis started");
                    self.app.state_mut().start_job(domain, job_id.clone());
                    self.poller = Some(JobPoller::spawn(Arc::clone(&self.api), job_id, self.poll_interval));
                }
                ApiTaskResult::SubmitFailed => {
                    self.app.state_mut().submit_failed();
                }
                ApiTaskResult::Summary { step, text } => {
                    self.app.state_mut().set_summary(step, text);
                }
                ApiTaskResult::SummaryFailed { step } => {
                    self.app.state_mut().summary_failed(step);
                }
            }
        }
    }

    /// Execute a pending action from the app state
    fn execute_action(&mut self, action: PendingAction) {
        debug!(?action, "TuiRunner::execute_action: called");
        match action {
            PendingAction::Submit(domain) => self.start_submit(domain),
            PendingAction::Summarize(index) => self.start_summary(index),
            PendingAction::Reset => {
                debug!("TuiRunner::execute_action: resetting for a new search");
                self.poller = None;
                // Abort the in-flight task so a stale result can't land
                // on the next analysis
                self.abort_task();
                self.app.state_mut().reset();
            }
        }
    }

    /// Submit a domain for analysis in a background task
    fn start_submit(&mut self, domain: String) {
        if self.task.is_some() {
            debug!(%domain, "TuiRunner::start_submit: a task is already in flight, ignoring");
            self.app.state_mut().submitting = false;
            return;
        }
        info!(%domain, "TuiRunner::start_submit: called");
        let api = Arc::clone(&self.api);
        let (tx, rx) = mpsc::channel(1);
        self.task_rx = Some(rx);

        self.task = Some(tokio::spawn(async move {
            let result = match api.start_analysis(&domain).await {
                Ok(response) => ApiTaskResult::Started {
                    domain,
                    job_id: response.job_id,
                },
                Err(e) => {
                    warn!(error = %e, "TuiRunner::start_submit: start_analysis failed");
                    ApiTaskResult::SubmitFailed
                }
            };
            let _ = tx.send(result).await;
        }));
    }

    /// Request a summary for the step card at this index in a background task
    fn start_summary(&mut self, index: usize) {
        if self.task.is_some() {
            debug!(index, "TuiRunner::start_summary: a task is already in flight, ignoring");
            if let Some(card) = self.app.state_mut().steps.get_mut(index) {
                card.summarizing = false;
            }
            return;
        }
        let Some(card) = self.app.state().steps.get(index) else {
            debug!(index, "TuiRunner::start_summary: no card at index");
            return;
        };
        let step = card.record.step;
        let record = card.record.clone();
        info!(step, "TuiRunner::start_summary: called");

        let api = Arc::clone(&self.api);
        let (tx, rx) = mpsc::channel(1);
        self.task_rx = Some(rx);

        self.task = Some(tokio::spawn(async move {
            let result = match api.summarize_step(&record).await {
                Ok(response) => ApiTaskResult::Summary {
                    step,
                    text: response.summary,
                },
                Err(e) => {
                    warn!(error = %e, step, "TuiRunner::start_summary: summarize_step failed");
                    ApiTaskResult::SummaryFailed { step }
                }
            };
            let _ = tx.send(result).await;
        }));
    }

    /// Handle mouse event
    fn handle_mouse(&mut self, mouse: crossterm::event::MouseEvent) {
        use crossterm::event::MouseEventKind;

        match mouse.kind {
            MouseEventKind::ScrollUp => self.app.handle_scroll(false),
            MouseEventKind::ScrollDown => self.app.handle_scroll(true),
            _ => {}
        }
    }
}
