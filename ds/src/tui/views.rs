//! TUI views and rendering
//!
//! All rendering logic is contained here. The views module is responsible
//! for drawing the UI based on AppState; the only state it touches is the
//! step-list scroll offset, to keep the selection visible.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use scoutapi::{AnalysisResult, Performance, value_text};
use tracing::trace;

use super::state::{AppState, ConfirmDialog, InteractionMode, StepCard, View};

/// Status colors (k9s-inspired)
mod colors {
    use ratatui::style::Color;

    pub const RUNNING: Color = Color::Rgb(0, 255, 127); // Spring green
    pub const COMPLETE: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const FAILED: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const AVERAGE: Color = Color::Rgb(255, 215, 0); // Gold
    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const SELECTED_BG: Color = Color::Rgb(40, 40, 40);
    pub const DIM: Color = Color::DarkGray;
}

/// Get color for a performance indicator
fn performance_color(performance: Performance) -> Color {
    match performance {
        Performance::Strong => colors::COMPLETE,
        Performance::Average => colors::AVERAGE,
        Performance::Weak => colors::FAILED,
    }
}

/// Get mark for a performance indicator
fn performance_mark(performance: Performance) -> &'static str {
    match performance {
        Performance::Strong => "▲",
        Performance::Average => "●",
        Performance::Weak => "▼",
    }
}

/// Main render function
pub fn render(state: &mut AppState, frame: &mut Frame) {
    trace!(?state.view, "render: called");
    // Create main layout: header, content, footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);

    match state.view {
        View::Search => render_search_view(state, frame, chunks[1]),
        View::Analysis => render_analysis_view(state, frame, chunks[1]),
    }

    render_footer(state, frame, chunks[2]);

    // Render overlays
    match &state.interaction_mode {
        InteractionMode::Help => render_help_overlay(frame, frame.area()),
        InteractionMode::Confirm(dialog) => render_confirm_dialog(dialog, frame, frame.area()),
        _ => {}
    }
}

/// Render header with app name, breadcrumb and backend URL
fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_header: called");
    // Activity indicator (colored dot before DealScout)
    let indicator_color = if state.polling || state.submitting {
        colors::RUNNING
    } else if state.result.is_some() {
        colors::COMPLETE
    } else {
        colors::DIM
    };

    let mut left_spans = vec![
        Span::raw(" "),
        Span::styled("●", Style::default().fg(indicator_color)),
        Span::styled(
            " DealScout",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::raw(state.view.display_name()),
    ];
    if state.view == View::Analysis
        && let Some(ref domain) = state.analyzed_domain
    {
        left_spans.push(Span::raw(" │ "));
        left_spans.push(Span::styled(domain.clone(), Style::default().add_modifier(Modifier::BOLD)));
    }

    let right_line = Line::from(vec![
        Span::styled(state.api_url.clone(), Style::default().fg(colors::DIM)),
        Span::raw(" "),
    ]);

    let header_block = Block::default().borders(Borders::ALL);
    let inner = header_block.inner(area);
    frame.render_widget(header_block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_line.width() as u16)])
        .split(inner);

    frame.render_widget(Paragraph::new(Line::from(left_spans)), chunks[0]);
    frame.render_widget(Paragraph::new(right_line), chunks[1]);
}

/// Render the centered domain entry screen
fn render_search_view(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_search_view: called");
    let popup = centered_rect(60, 50, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(1), // Tagline
            Constraint::Length(1),
            Constraint::Length(3), // Input box
            Constraint::Length(1), // Hint
        ])
        .split(popup);

    let title = Paragraph::new(Line::from(Span::styled(
        "DealScout",
        Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
    )))
    .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let tagline = Paragraph::new("Analyze acquisition targets by company domain")
        .style(Style::default().fg(colors::DIM))
        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(tagline, chunks[1]);

    let input_line = Line::from(vec![
        Span::styled("> ", Style::default().fg(colors::KEYBIND)),
        Span::raw(state.search_input.clone()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    let input = Paragraph::new(input_line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Domain ")
            .border_style(Style::default().fg(colors::HEADER)),
    );
    frame.render_widget(input, chunks[3]);

    let hint = if state.submitting {
        Line::from(vec![
            Span::styled(state.spinner_frame(), Style::default().fg(colors::RUNNING)),
            Span::styled(" Starting analysis...", Style::default().fg(colors::DIM)),
        ])
    } else {
        Line::from(Span::styled("Enter to analyze", Style::default().fg(colors::DIM)))
    };
    frame.render_widget(
        Paragraph::new(hint).alignment(ratatui::layout::Alignment::Center),
        chunks[4],
    );
}

/// Render the analysis screen: status line, step cards, final result
fn render_analysis_view(state: &mut AppState, frame: &mut Frame, area: Rect) {
    trace!("render_analysis_view: called");
    let constraints = if state.result.is_some() {
        vec![Constraint::Length(2), Constraint::Min(0), Constraint::Length(9)]
    } else {
        vec![Constraint::Length(2), Constraint::Min(0)]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_status_line(state, frame, chunks[0]);
    render_steps(state, frame, chunks[1]);

    if let Some(ref result) = state.result {
        render_result(result, frame, chunks[2]);
    }
}

/// Render the one-line job status above the step list
fn render_status_line(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_status_line: called");
    let line = if state.polling || state.submitting {
        let status = state.job_status.as_deref().unwrap_or("Starting analysis...");
        let elapsed = state.elapsed().map(format_elapsed).unwrap_or_else(|| "0s".to_string());
        Line::from(vec![
            Span::styled(format!(" {} ", state.spinner_frame()), Style::default().fg(colors::RUNNING)),
            Span::raw(status.to_string()),
            Span::styled(format!("  {elapsed}"), Style::default().fg(colors::DIM)),
        ])
    } else if state.result.is_some() {
        Line::from(vec![
            Span::styled(" ✓ ", Style::default().fg(colors::COMPLETE).add_modifier(Modifier::BOLD)),
            Span::raw("Analysis complete"),
            Span::styled(
                format!("  {} steps", state.steps.len()),
                Style::default().fg(colors::DIM),
            ),
        ])
    } else {
        let status = state.job_status.clone().unwrap_or_else(|| "Analysis failed".to_string());
        Line::from(vec![
            Span::styled(" ✗ ", Style::default().fg(colors::FAILED).add_modifier(Modifier::BOLD)),
            Span::styled(status, Style::default().fg(colors::FAILED)),
        ])
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the scrollable step card list
fn render_steps(state: &mut AppState, frame: &mut Frame, area: Rect) {
    trace!(steps = state.steps.len(), "render_steps: called");
    let spinner = state.spinner_frame();
    let newest = state.steps.last().map(|card| card.record.step);
    let selected = state.steps_selection.selected_index;

    // Build all card lines, remembering where each card starts
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut card_starts = Vec::with_capacity(state.steps.len());
    for (i, card) in state.steps.iter().enumerate() {
        card_starts.push(lines.len());
        let in_progress = state.polling && newest == Some(card.record.step);
        lines.extend(step_card_lines(card, i == selected, in_progress, spinner));
        lines.push(Line::from(""));
    }

    // Keep the selected card's title line visible
    let inner_height = area.height.saturating_sub(2) as usize; // -2 for borders
    let selected_line = card_starts.get(selected).copied().unwrap_or(0);
    if inner_height > 0 {
        let scroll = &mut state.steps_selection.scroll_offset;
        if selected_line >= *scroll + inner_height {
            *scroll = selected_line.saturating_sub(inner_height - 1);
        } else if selected_line < *scroll {
            *scroll = selected_line;
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Steps ({}) ", state.steps.len()))
                .border_style(Style::default().fg(colors::HEADER)),
        )
        .scroll((state.steps_selection.scroll_offset as u16, 0));

    frame.render_widget(paragraph, area);

    if state.steps.is_empty() {
        render_empty_message(frame, area, "Waiting for the first analysis step...");
    }
}

/// Build the display lines for one step card
fn step_card_lines(card: &StepCard, is_selected: bool, in_progress: bool, spinner: &'static str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (mark, mark_color) = match card.record.performance() {
        Some(performance) => (performance_mark(performance), performance_color(performance)),
        None if in_progress => (spinner, colors::RUNNING),
        None => ("●", colors::DIM),
    };

    // Title line carries the selection highlight
    let mut title_line = Line::from(vec![
        Span::styled(format!(" {mark} "), Style::default().fg(mark_color)),
        Span::styled(format!("Step {}: ", card.record.step), Style::default().fg(colors::DIM)),
        Span::styled(card.record.display_title(), Style::default().add_modifier(Modifier::BOLD)),
    ]);
    if is_selected {
        title_line.style = Style::default().bg(colors::SELECTED_BG);
    }
    lines.push(title_line);

    // Findings: one "Key: value" line per field, markdown-rendered
    for (key, value) in &card.record.fields {
        let text = value_text(value);
        if text.is_empty() {
            continue;
        }
        let rendered = owned_markdown_lines(&text);
        if rendered.len() == 1 {
            let mut spans = vec![
                Span::raw("   "),
                Span::styled(format!("{}: ", format_field_key(key)), Style::default().fg(colors::DIM)),
            ];
            if let Some(line) = rendered.into_iter().next() {
                spans.extend(line.spans);
            }
            lines.push(Line::from(spans));
        } else {
            lines.push(Line::from(vec![
                Span::raw("   "),
                Span::styled(format!("{}:", format_field_key(key)), Style::default().fg(colors::DIM)),
            ]));
            for line in rendered {
                lines.push(indent_line(line, "     "));
            }
        }
    }

    // Performance commentary from the scoring model
    if let Some(comment) = card.record.performance_comment.as_deref()
        && !comment.trim().is_empty()
    {
        lines.push(Line::from(vec![
            Span::raw("   "),
            Span::styled(comment.to_string(), Style::default().fg(mark_color)),
        ]));
    }

    // Calculation explanation folds behind Enter
    if card.has_explanation() {
        if card.expanded {
            if let Some(explanation) = card.record.calculation_explanation.as_deref() {
                for (i, line) in owned_markdown_lines(explanation).into_iter().enumerate() {
                    let prefix = if i == 0 { "   └ " } else { "     " };
                    lines.push(indent_line(line, prefix));
                }
            }
        } else {
            lines.push(Line::from(Span::styled(
                "   … calculation explanation (enter to expand)",
                Style::default().fg(colors::DIM),
            )));
        }
    }

    // Plain-English summary, fetched on demand
    if card.summarizing {
        lines.push(Line::from(vec![
            Span::styled("   └ ", Style::default().fg(colors::DIM)),
            Span::styled(format!("{spinner} Summarizing..."), Style::default().fg(colors::DIM)),
        ]));
    } else if let Some(summary) = card.summary.as_deref() {
        for (i, line) in owned_markdown_lines(summary).into_iter().enumerate() {
            let prefix = if i == 0 { "   └ " } else { "     " };
            lines.push(indent_line(line, prefix));
        }
    }

    lines
}

/// Render the final six-metric scoring block
fn render_result(result: &AnalysisResult, frame: &mut Frame, area: Rect) {
    trace!(domain = %result.domain, "render_result: called");
    let metrics = &result.metrics;
    let cells = [
        ("Overall Score", metrics.score_text()),
        ("Potential", metrics.potential.clone()),
        ("Market Size", metrics.market_size.clone()),
        ("Company Age", metrics.company_age.clone()),
        ("Market Position", metrics.market_position.clone()),
        ("Recommendation", metrics.recommendation.clone()),
    ];

    let mut lines = vec![Line::from("")];
    for pair in cells.chunks(2) {
        let mut spans = vec![Span::raw("  ")];
        for (label, value) in pair {
            let value_style = if *label == "Overall Score" {
                Style::default().fg(colors::COMPLETE).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            spans.push(Span::styled(format!("{label:<17}"), Style::default().fg(colors::DIM)));
            spans.push(Span::styled(format!("{value:<18}"), value_style));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            " Final Analysis for {} ({}) ",
            result.domain,
            format_analyzed_at(&result.analyzed_at)
        ))
        .border_style(Style::default().fg(colors::COMPLETE));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!(?state.interaction_mode, "render_footer: called");
    // Show error or context-sensitive keybinds
    if let Some(ref error) = state.error_message {
        let footer = Paragraph::new(Line::from(Span::styled(
            format!(" Error: {}", error),
            Style::default().fg(colors::FAILED),
        )))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
        return;
    }

    // Show keybinds based on current view
    let keybinds = match state.view {
        View::Search => vec![("[Enter]", "Analyze"), ("[Esc]", "Clear")],
        View::Analysis => vec![
            ("[j/k]", "Move"),
            ("[Enter]", "Expand"),
            ("[s]", "Summarize"),
            ("[n]", "New Search"),
        ],
    };

    // Left side: view-specific keybinds
    let mut left_spans = vec![Span::raw(" ")];
    for (key, action) in keybinds {
        left_spans.push(Span::styled(
            key,
            Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD),
        ));
        left_spans.push(Span::raw(format!(" {} ", action)));
    }

    // Right side: Help, Quit
    let right_line = Line::from(vec![
        Span::styled("[?]", Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)),
        Span::raw(" Help "),
        Span::styled("[q]", Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)),
        Span::raw(" Quit "),
    ]);

    let footer_block = Block::default().borders(Borders::ALL);
    let inner = footer_block.inner(area);
    frame.render_widget(footer_block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_line.width() as u16)])
        .split(inner);

    frame.render_widget(Paragraph::new(Line::from(left_spans)), chunks[0]);
    frame.render_widget(Paragraph::new(right_line), chunks[1]);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    trace!("render_help_overlay: called");
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                .fg(colors::HEADER),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Global",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        key_line("?", "Toggle help"),
        key_line("q", "Quit (confirms while a job is running)"),
        key_line("Ctrl+C", "Force quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Search",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        key_line("Enter", "Analyze the entered domain"),
        key_line("Esc", "Clear the input"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Analysis",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        key_line("j/↓", "Move down"),
        key_line("k/↑", "Move up"),
        key_line("g", "Go to first step"),
        key_line("G", "Go to last step"),
        key_line("Enter/o", "Expand/collapse calculation explanation"),
        key_line("s", "Summarize selected step"),
        key_line("n", "Start a new search"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (? to close) ")
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help, popup_area);
}

/// Helper to create a key binding line
fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}", key), Style::default().fg(colors::KEYBIND)),
        Span::raw(desc),
    ])
}

/// Render confirmation dialog
fn render_confirm_dialog(dialog: &ConfirmDialog, frame: &mut Frame, area: Rect) {
    trace!("render_confirm_dialog: called");
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let yes_style = if dialog.selected_button {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };

    let no_style = if !dialog.selected_button {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red)
    };

    let content = vec![
        Line::from(""),
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::raw("       "),
            Span::styled(" No ", no_style),
            Span::raw("    "),
            Span::styled(" Yes ", yes_style),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Tab/←→: switch  Enter: confirm  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )]),
    ];

    let dialog_widget = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .style(Style::default().bg(Color::Black)),
        )
        .alignment(ratatui::layout::Alignment::Center);

    frame.render_widget(dialog_widget, popup_area);
}

/// Render empty state message
fn render_empty_message(frame: &mut Frame, area: Rect, message: &str) {
    trace!(%message, "render_empty_message: called");
    let inner = area.inner(ratatui::layout::Margin {
        horizontal: 2,
        vertical: 2,
    });

    let empty = Paragraph::new(message)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(ratatui::layout::Alignment::Center);

    frame.render_widget(empty, inner);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    trace!(percent_x, percent_y, "centered_rect: called");
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Re-own markdown output so card lines carry no borrows
fn owned_markdown_lines(text: &str) -> Vec<Line<'static>> {
    tui_markdown::from_str(text)
        .lines
        .iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .iter()
                .map(|span| Span::styled(span.content.to_string(), span.style))
                .collect();
            let mut owned = Line::from(spans);
            owned.style = line.style;
            owned
        })
        .collect()
}

/// Prefix a line with indentation, keeping its styling
fn indent_line(line: Line<'static>, prefix: &'static str) -> Line<'static> {
    let style = line.style;
    let mut spans = vec![Span::raw(prefix)];
    spans.extend(line.spans);
    let mut out = Line::from(spans);
    out.style = style;
    out
}

/// Format a snake_case field key for display (e.g., "market_size" -> "Market Size")
fn format_field_key(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format the backend's naive ISO timestamp for display, falling back
/// to the raw string when it does not parse
fn format_analyzed_at(raw: &str) -> String {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Format elapsed time for display (e.g., "45s", "1m 15s")
fn format_elapsed(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
