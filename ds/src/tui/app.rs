//! TUI application - event handling and state management
//!
//! The App struct owns the AppState and handles all keyboard events.
//! It does not do any rendering - that's delegated to the views module.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, trace};

use super::state::{AppState, ConfirmAction, ConfirmDialog, InteractionMode, PendingAction, View};

/// TUI application
#[derive(Debug)]
pub struct App {
    /// Application state
    state: AppState,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create a new application instance
    pub fn new() -> Self {
        debug!("App::new: called");
        Self { state: AppState::new() }
    }

    /// Get reference to state
    pub fn state(&self) -> &AppState {
        trace!("App::state: called");
        &self.state
    }

    /// Get mutable reference to state
    pub fn state_mut(&mut self) -> &mut AppState {
        trace!("App::state_mut: called");
        &mut self.state
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, "App::handle_key: called");
        // Clear any transient error message on key press
        self.state.clear_error();

        match &self.state.interaction_mode {
            InteractionMode::Input => self.handle_input_key(key),
            InteractionMode::Normal => self.handle_normal_key(key),
            InteractionMode::Confirm(_) => self.handle_confirm_key(key),
            InteractionMode::Help => self.handle_help_key(key),
        }
    }

    /// Handle key while typing in the domain search box
    fn handle_input_key(&mut self, key: KeyEvent) -> bool {
        trace!(?key, "App::handle_input_key: called");
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                debug!("App::handle_input_key: Ctrl+C force quit");
                return true;
            }
            (KeyCode::Enter, _) => {
                if !self.state.submitting {
                    self.state.submit_search();
                }
            }
            (KeyCode::Esc, _) => {
                self.state.search_input.clear();
            }
            (KeyCode::Backspace, _) => {
                self.state.search_input.pop();
            }
            (KeyCode::Char(c), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.search_input.push(c);
            }
            _ => {}
        }

        false
    }

    /// Handle key in normal mode (analysis view)
    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, "App::handle_normal_key: called");
        let step_count = self.state.steps.len();

        match (key.code, key.modifiers) {
            // === Quit ===
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                debug!("App::handle_normal_key: Ctrl+C force quit");
                return true;
            }
            (KeyCode::Char('q'), _) => {
                if self.state.polling || self.state.submitting {
                    debug!("App::handle_normal_key: job running, showing quit confirm");
                    self.state.interaction_mode = InteractionMode::Confirm(ConfirmDialog::quit());
                } else {
                    debug!("App::handle_normal_key: quitting");
                    self.state.should_quit = true;
                }
            }

            // === Help ===
            (KeyCode::Char('?'), _) | (KeyCode::F(1), _) => {
                self.state.interaction_mode = InteractionMode::Help;
            }

            // === New search ===
            (KeyCode::Char('n'), _) => {
                debug!("App::handle_normal_key: new search requested");
                self.state.pending_action = Some(PendingAction::Reset);
            }

            // === Step list navigation ===
            (KeyCode::Char('j'), _) | (KeyCode::Down, _) => {
                self.state.steps_selection.select_next(step_count);
            }
            (KeyCode::Char('k'), _) | (KeyCode::Up, _) => {
                self.state.steps_selection.select_prev();
            }
            (KeyCode::Char('g'), _) | (KeyCode::Home, _) => {
                self.state.steps_selection.select_first();
            }
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                self.state.steps_selection.select_last(step_count);
            }

            // === Step card actions ===
            (KeyCode::Enter, _) | (KeyCode::Char('o'), _) => {
                self.state.toggle_selected_expanded();
            }
            (KeyCode::Char('s'), _) => {
                self.state.request_summary();
            }

            _ => {
                trace!("App::handle_normal_key: unhandled key");
            }
        }

        false
    }

    /// Handle key in confirm dialog mode
    fn handle_confirm_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, "App::handle_confirm_key: called");
        match key.code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Enter => {
                if let InteractionMode::Confirm(dialog) = &self.state.interaction_mode
                    && dialog.selected_button
                {
                    match dialog.action {
                        ConfirmAction::Quit => {
                            debug!("App::handle_confirm_key: quit confirmed");
                            self.state.should_quit = true;
                        }
                    }
                }
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let InteractionMode::Confirm(dialog) = &mut self.state.interaction_mode {
                    if key.code == KeyCode::Char('y') || key.code == KeyCode::Char('Y') {
                        dialog.selected_button = true;
                    } else {
                        dialog.selected_button = !dialog.selected_button;
                    }
                }
            }
            _ => {
                debug!("App::handle_confirm_key: unhandled key");
            }
        }

        false
    }

    /// Handle key in help mode
    fn handle_help_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, "App::handle_help_key: called");
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            _ => {}
        }

        false
    }

    /// Scroll wheel moves the step selection in the analysis view
    pub fn handle_scroll(&mut self, down: bool) {
        if self.state.view != View::Analysis {
            return;
        }
        let step_count = self.state.steps.len();
        if down {
            self.state.steps_selection.select_next(step_count);
        } else {
            self.state.steps_selection.select_prev();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::mock::running_snapshot;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    /// App on the analysis view with a running job and some steps
    fn analyzing_app(steps: u32) -> App {
        let mut app = App::new();
        type_str(&mut app, "acme.io");
        app.handle_key(key(KeyCode::Enter));
        app.state_mut().start_job("acme.io".to_string(), "job-1".to_string());
        app.state_mut()
            .apply_status(running_snapshot("Analyzing market position...", steps));
        app
    }

    // === Input mode ===

    #[test]
    fn test_app_starts_on_search_input() {
        let app = App::new();
        assert_eq!(app.state().view, View::Search);
        assert!(matches!(app.state().interaction_mode, InteractionMode::Input));
    }

    #[test]
    fn test_typing_fills_search_input() {
        let mut app = App::new();
        type_str(&mut app, "acme.io");
        assert_eq!(app.state().search_input, "acme.io");

        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.state().search_input, "acme.i");
    }

    #[test]
    fn test_enter_submits_search() {
        let mut app = App::new();
        type_str(&mut app, "acme.io");
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(
            app.state().pending_action,
            Some(PendingAction::Submit(ref d)) if d == "acme.io"
        ));
    }

    #[test]
    fn test_esc_clears_search_input() {
        let mut app = App::new();
        type_str(&mut app, "acme.io");
        app.handle_key(key(KeyCode::Esc));
        assert!(app.state().search_input.is_empty());
    }

    #[test]
    fn test_ctrl_c_quits_from_input_mode() {
        let mut app = App::new();
        let quit = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(quit);
        // And the 'c' did not land in the input buffer
        assert!(app.state().search_input.is_empty());
    }

    // === Normal mode ===

    #[test]
    fn test_quit_confirms_while_polling() {
        let mut app = analyzing_app(2);
        assert!(app.state().polling);

        app.handle_key(key(KeyCode::Char('q')));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Confirm(_)));
        assert!(!app.state().should_quit);

        // y selects Yes, Enter fires it
        app.handle_key(key(KeyCode::Char('y')));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.state().should_quit);
    }

    #[test]
    fn test_quit_confirm_can_be_cancelled() {
        let mut app = analyzing_app(2);
        app.handle_key(key(KeyCode::Char('q')));
        app.handle_key(key(KeyCode::Esc));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));
        assert!(!app.state().should_quit);
    }

    #[test]
    fn test_quit_is_immediate_once_idle() {
        let mut app = analyzing_app(2);
        app.state_mut().polling = false;
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.state().should_quit);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = analyzing_app(1);
        app.handle_key(key(KeyCode::Char('?')));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Help));
        app.handle_key(key(KeyCode::Char('?')));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));
    }

    #[test]
    fn test_step_navigation_keys() {
        let mut app = analyzing_app(3);
        assert_eq!(app.state().steps_selection.selected_index, 0);

        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.state().steps_selection.selected_index, 1);

        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.state().steps_selection.selected_index, 0);

        app.handle_key(key(KeyCode::Char('G')));
        assert_eq!(app.state().steps_selection.selected_index, 2);

        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.state().steps_selection.selected_index, 0);
    }

    #[test]
    fn test_enter_toggles_explanation_fold() {
        let mut app = analyzing_app(1);
        app.state_mut().steps[0].record.calculation_explanation = Some("math".to_string());

        app.handle_key(key(KeyCode::Enter));
        assert!(app.state().steps[0].expanded);
        app.handle_key(key(KeyCode::Char('o')));
        assert!(!app.state().steps[0].expanded);
    }

    #[test]
    fn test_s_requests_summary_for_selected_step() {
        let mut app = analyzing_app(2);
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Char('s')));
        assert!(matches!(app.state().pending_action, Some(PendingAction::Summarize(1))));
        assert!(app.state().steps[1].summarizing);
    }

    #[test]
    fn test_n_queues_new_search() {
        let mut app = analyzing_app(2);
        app.handle_key(key(KeyCode::Char('n')));
        assert!(matches!(app.state().pending_action, Some(PendingAction::Reset)));
    }

    #[test]
    fn test_any_key_dismisses_error() {
        let mut app = analyzing_app(2);
        app.state_mut().set_error("Failed to get job status");
        app.handle_key(key(KeyCode::Char('j')));
        assert!(app.state().error_message.is_none());
    }

    #[test]
    fn test_scroll_moves_selection() {
        let mut app = analyzing_app(3);
        app.handle_scroll(true);
        assert_eq!(app.state().steps_selection.selected_index, 1);
        app.handle_scroll(false);
        assert_eq!(app.state().steps_selection.selected_index, 0);
    }
}
