// src/ui/widgets/disclaimer_popup.rs

use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Renders the authorization notice shown on launch. It stays on top of the
/// UI until acknowledged, and no scan can start while it is visible.
pub fn render_disclaimer_popup(frame: &mut Frame, area: Rect) {
    let disclaimer_text = Text::from(vec![
        Line::from("AUTHORIZED TESTING ONLY".bold().yellow()),
        Line::from(""),
        Line::from("BountyForge RS performs active reconnaissance: DNS lookups, TCP connects, HTTP requests and vulnerability probes. It is intended for bug bounty programs and engagements where you are explicitly authorized to test the target."),
        Line::from(""),
        Line::from("Probing hosts outside an authorized scope is illegal in many jurisdictions and violates the rules of every bug bounty program. Check the program scope before every scan."),
        Line::from(""),
        Line::from("By continuing you confirm that:"),
        Line::from("1. The target is yours or is in scope of a program or written agreement."),
        Line::from("2. You will respect the program's rate limits and testing rules."),
        Line::from("3. You alone are responsible for how the findings are obtained and used."),
        Line::from(""),
        Line::from("Press ".bold() + "Enter".bold().yellow() + " to confirm and continue".bold()),
    ]);

    let block = Block::default()
        .title("Authorized Use Only")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let popup_area = centered_rect(70, 80, area);

    let popup = Paragraph::new(disclaimer_text)
        .block(block)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    // Clear first or the results underneath bleed through.
    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

/// A rectangle of the given percentages, centered in `r`.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center).areas(r);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center).areas(row);
    area
}
