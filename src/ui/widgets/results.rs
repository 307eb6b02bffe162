// src/ui/widgets/results.rs

use crate::app::{App, AppState, SPINNER_CHARS, Tab};
use bountyforge_rs::Severity;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, Tabs, Wrap},
};

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default().fg(Color::Red).bold(),
        Severity::Warning => Style::default().fg(Color::Yellow),
        Severity::Success => Style::default().fg(Color::Green),
        Severity::Info => Style::default().fg(Color::Gray),
    }
}

/// Renders the tab bar: the overview plus one tab per phase with its live count.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .into_iter()
        .map(|tab| match tab {
            Tab::Overview => Line::from(tab.title()),
            Tab::Phase(phase) if !app.options.is_enabled(phase) => {
                Line::from(tab.title()).style(Style::default().fg(Color::DarkGray))
            }
            Tab::Phase(phase) => Line::from(format!("{} ({})", tab.title(), app.live_count(phase))),
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Results (Tab / ← → to switch)"))
        .select(app.tab_index)
        .highlight_style(Style::default().fg(Color::Cyan).bold().underlined());
    frame.render_widget(tabs, area);
}

/// Renders the progress lines of the selected tab, colored by severity.
pub fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = match app.state {
        AppState::Scanning => format!("{} Scanning {}", SPINNER_CHARS[app.spinner_frame], app.input),
        _ => format!("{} (↑ ↓ to scroll)", app.current_tab().title()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let lines: Vec<Line> = app
        .visible_lines()
        .iter()
        .map(|event| Line::from(Span::styled(event.text.clone(), severity_style(event.severity))))
        .collect();

    if lines.is_empty() {
        let placeholder = match (app.state, app.current_tab()) {
            (AppState::Idle, _) => "Enter a domain and press Enter to start the scan.",
            (_, Tab::Phase(phase)) if !app.options.is_enabled(phase) => "Phase disabled for this scan.",
            (AppState::Scanning, _) => "Waiting for results...",
            (AppState::Finished, _) => "Nothing to show.",
        };
        let paragraph = Paragraph::new(placeholder)
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    let line_count = lines.len();
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset as u16, 0));
    frame.render_widget(paragraph, area);

    app.report_scroll_state = app.report_scroll_state.content_length(line_count).position(app.scroll_offset);
    let scrollbar = Scrollbar::default()
        .orientation(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"));
    frame.render_stateful_widget(
        scrollbar,
        area.inner(Margin { vertical: 1, horizontal: 0 }),
        &mut app.report_scroll_state,
    );
}
