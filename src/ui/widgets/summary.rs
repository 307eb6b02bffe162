// src/ui/widgets/summary.rs

use crate::app::{App, AppState};
use bountyforge_rs::{Phase, ScanState};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

/// Renders the summary panel: per-phase counts, issue rollups, run state and duration.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(5), // Findings per phase
            Constraint::Length(1),
            Constraint::Length(4), // Issues
            Constraint::Length(1),
            Constraint::Min(0), // Run state
        ])
        .split(area);

    let mut count_lines = vec![Line::from("FINDINGS".bold())];
    for phase in Phase::in_order() {
        let value = if app.options.is_enabled(phase) || app.state == AppState::Finished {
            app.live_count(phase).to_string()
        } else {
            "-".to_string()
        };
        count_lines.push(Line::from(vec![
            Span::raw(format!("{}: ", phase.summary_label())),
            Span::styled(value, Style::default().fg(Color::Cyan)),
        ]));
    }
    frame.render_widget(Paragraph::new(count_lines), summary_chunks[0]);

    if app.state != AppState::Finished {
        let status = match app.state {
            AppState::Scanning => Line::from(Span::styled("RUNNING", Style::default().fg(Color::Cyan))),
            _ => Line::from(Span::styled("IDLE", Style::default().fg(Color::DarkGray))),
        };
        frame.render_widget(Paragraph::new(vec![Line::from("STATE".bold()), status]), summary_chunks[4]);
        return;
    }

    let issues = Text::from(vec![
        Line::from("ISSUES FOUND".bold()),
        Line::from(vec![
            Span::raw("Critical: "),
            Span::styled(app.summary.critical_issues.to_string(), Style::default().fg(Color::Red)),
        ]),
        Line::from(vec![
            Span::raw("Warnings: "),
            Span::styled(app.summary.warning_issues.to_string(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::raw("Indeterminate: "),
            Span::styled(app.summary.indeterminate.to_string(), Style::default().fg(Color::Gray)),
        ]),
    ]);
    frame.render_widget(Paragraph::new(issues), summary_chunks[2]);

    let state_style = match app.summary.state {
        Some(ScanState::Stopped) => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Green),
    };
    let state = app.summary.state.map(|s| s.to_string()).unwrap_or_default();
    let run_lines = vec![
        Line::from("STATE".bold()),
        Line::from(Span::styled(state, state_style)),
        Line::from(format!("Duration: {:.1}s", app.summary.duration_secs)),
    ];
    frame.render_widget(Paragraph::new(run_lines), summary_chunks[4]);
}
