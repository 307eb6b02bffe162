// src/ui/widgets/input.rs

use crate::app::{App, AppState};
use bountyforge_rs::Phase;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Renders the target input box. Validation errors replace the title.
pub fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_block = match &app.input_error {
        Some(error) => Block::default()
            .borders(Borders::ALL)
            .title(format!("Target Domain: {error}"))
            .border_style(Style::default().fg(Color::Red)),
        None => Block::default().borders(Borders::ALL).title("Target Domain"),
    };
    let input_paragraph = Paragraph::new(app.input.as_str())
        .block(input_block)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(input_paragraph, area);

    if app.state == AppState::Idle && !app.show_disclaimer {
        frame.set_cursor_position((area.x + app.input.chars().count() as u16 + 1, area.y + 1));
    }
}

/// Renders the phase checkboxes with their function-key toggles.
pub fn render_options(frame: &mut Frame, app: &App, area: Rect) {
    let locked = app.state != AppState::Idle;
    let mut spans = Vec::new();
    for (i, phase) in Phase::in_order().enumerate() {
        let (mark, style) = if app.options.is_enabled(phase) {
            ("[x]", Style::default().fg(Color::Green))
        } else {
            ("[ ]", Style::default().fg(Color::DarkGray))
        };
        spans.push(Span::styled(format!("F{} ", i + 1), Style::new().bold().fg(Color::Yellow)));
        spans.push(Span::styled(format!("{mark} {phase}"), style));
        spans.push(Span::raw("   "));
    }

    let title = if locked { "Scan Options (locked)" } else { "Scan Options" };
    let options = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(options, area);
}
