// src/ui/widgets/footer.rs

use crate::app::{App, AppState, ExportStatus};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

fn key(label: &str) -> Span<'_> {
    Span::styled(label, Style::new().bold().fg(Color::Yellow))
}

/// Renders the footer widget, which displays available actions.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let spans = match app.state {
        AppState::Idle => Line::from(vec![
            key("Enter"),
            Span::raw(" to scan, "),
            key("F1-F4"),
            Span::raw(" toggle phases, "),
            key("Esc"),
            Span::raw(" to quit."),
        ]),
        AppState::Scanning => Line::from(vec![
            Span::raw("Scanning... "),
            key("Esc"),
            Span::raw(" to stop, "),
            key("Tab"),
            Span::raw(" switch view, "),
            key("↑↓"),
            Span::raw(" scroll."),
        ]),
        AppState::Finished => match &app.export_status {
            ExportStatus::Success(path) => Line::from(vec![
                Span::styled("Report saved to ", Style::new().fg(Color::Green)),
                Span::raw(path.as_str()),
            ]),
            ExportStatus::Error(error) => {
                Line::from(Span::styled(format!("Export failed: {error}"), Style::new().fg(Color::Red)))
            }
            ExportStatus::Idle => Line::from(vec![
                key("[N]"),
                Span::raw("ew Scan, "),
                key("[E]"),
                Span::raw("xport, "),
                key("Tab"),
                Span::raw(" switch view, "),
                key("[Q]"),
                Span::raw("uit"),
            ]),
        },
    };

    let footer = Paragraph::new(spans).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
