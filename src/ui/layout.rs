// src/ui/layout.rs

use ratatui::layout::{Constraint, Layout, Rect};

/// Screen regions, computed once per frame.
pub struct AppLayout {
    pub input: Rect,
    pub options: Rect,
    pub tabs: Rect,
    pub results: Rect,
    pub summary: Rect,
    pub footer: Rect,
}

/// Target input and phase toggles on top, tabbed results beside the summary
/// panel, and a one-line footer.
pub fn create_layout(frame_size: Rect) -> AppLayout {
    let [input, options, content, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame_size);

    let [left, summary] =
        Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)]).areas(content);
    let [tabs, results] = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(left);

    AppLayout { input, options, tabs, results, summary, footer }
}
