// src/app.rs

use bountyforge_rs::core::models::{Phase, ProgressEvent, ScanOptions, ScanState};
use bountyforge_rs::core::orchestrator::ScanRun;
use bountyforge_rs::core::target::Target;
use bountyforge_rs::{ScanError, ValidationError};
use ratatui::widgets::ScrollbarState;

pub const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub enum ExportStatus {
    Idle,
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

/// Result tabs: the overview stream followed by one tab per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Phase(Phase),
}

impl Tab {
    pub fn all() -> Vec<Tab> {
        std::iter::once(Tab::Overview).chain(Phase::in_order().map(Tab::Phase)).collect()
    }

    pub fn title(&self) -> String {
        match self {
            Tab::Overview => "Overview".to_string(),
            Tab::Phase(phase) => phase.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanSummary {
    pub counts: [usize; 4],
    pub critical_issues: usize,
    pub warning_issues: usize,
    pub indeterminate: usize,
    pub state: Option<ScanState>,
    pub duration_secs: f64,
}

pub struct App {
    pub should_quit: bool,
    pub show_disclaimer: bool,
    pub state: AppState,
    pub input: String,
    pub options: ScanOptions,
    pub input_error: Option<String>,
    pub tab_index: usize,
    /// The phase whose tab was last opened automatically.
    pub followed_phase: Option<Phase>,
    pub overview: Vec<ProgressEvent>,
    pub phase_logs: [Vec<ProgressEvent>; 4],
    pub scan_run: Option<ScanRun>,
    pub summary: ScanSummary,
    pub scroll_offset: usize,
    pub report_scroll_state: ScrollbarState,
    pub export_status: ExportStatus,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            should_quit: false,
            show_disclaimer: true,
            state: AppState::Idle,
            input: String::new(),
            options,
            input_error: None,
            tab_index: 0,
            followed_phase: None,
            overview: Vec::new(),
            phase_logs: Default::default(),
            scan_run: None,
            summary: ScanSummary::default(),
            scroll_offset: 0,
            report_scroll_state: ScrollbarState::default(),
            export_status: ExportStatus::Idle,
            spinner_frame: 0,
        }
    }

    pub fn current_tab(&self) -> Tab {
        Tab::all()[self.tab_index]
    }

    pub fn next_tab(&mut self) {
        self.tab_index = (self.tab_index + 1) % Tab::all().len();
        self.reset_scroll();
    }

    pub fn previous_tab(&mut self) {
        let count = Tab::all().len();
        self.tab_index = (self.tab_index + count - 1) % count;
        self.reset_scroll();
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if let Some(index) = Tab::all().iter().position(|t| *t == tab) {
            self.tab_index = index;
            self.reset_scroll();
        }
    }

    /// Progress lines for the selected tab.
    pub fn visible_lines(&self) -> &[ProgressEvent] {
        match self.current_tab() {
            Tab::Overview => &self.overview,
            Tab::Phase(phase) => &self.phase_logs[phase.index()],
        }
    }

    pub fn toggle_option(&mut self, phase: Phase) {
        self.options.toggle(phase);
    }

    /// Validates the typed target. On success the app enters the scanning state.
    pub fn begin_scan(&mut self) -> Result<Target, ValidationError> {
        match Target::parse(&self.input) {
            Ok(target) => {
                self.input = target.to_string();
                self.input_error = None;
                self.clear_results();
                self.state = AppState::Scanning;
                Ok(target)
            }
            Err(e) => {
                self.input_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Routes a live progress line to its tab. The tab of a phase is opened
    /// once when that phase starts; after that the operator may navigate freely.
    pub fn push_event(&mut self, event: ProgressEvent) {
        match event.phase {
            None => self.overview.push(event),
            Some(phase) => {
                if self.state == AppState::Scanning && self.followed_phase != Some(phase) {
                    self.followed_phase = Some(phase);
                    self.select_tab(Tab::Phase(phase));
                }
                self.phase_logs[phase.index()].push(event);
            }
        }
    }

    pub fn finish_scan(&mut self, result: Result<ScanRun, ScanError>) {
        match result {
            Ok(run) => {
                self.scan_run = Some(run);
                self.state = AppState::Finished;
                self.update_summary();
                self.select_tab(Tab::Overview);
            }
            Err(e) => {
                self.input_error = Some(e.to_string());
                self.state = AppState::Idle;
            }
        }
    }

    pub fn update_summary(&mut self) {
        if let Some(run) = &self.scan_run {
            let store = run.store();
            let mut counts = [0; 4];
            for phase in Phase::in_order() {
                counts[phase.index()] = store.count_by(phase);
            }
            self.summary = ScanSummary {
                counts,
                critical_issues: store.critical_count(),
                warning_issues: store.warning_count(),
                indeterminate: run.failures().len(),
                state: Some(run.state()),
                duration_secs: run.duration().as_secs_f64(),
            };
        }
    }

    /// Live counts while scanning, derived from the progress stream.
    pub fn live_count(&self, phase: Phase) -> usize {
        match &self.scan_run {
            Some(run) if self.state == AppState::Finished => run.store().count_by(phase),
            _ => self.phase_logs[phase.index()].iter().filter(|e| e.finding).count(),
        }
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Scanning {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn scroll_down(&mut self) {
        let max = self.visible_lines().len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + 1).min(max);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
        self.report_scroll_state = ScrollbarState::default();
    }

    fn clear_results(&mut self) {
        self.overview.clear();
        self.phase_logs = Default::default();
        self.scan_run = None;
        self.summary = ScanSummary::default();
        self.export_status = ExportStatus::Idle;
        self.tab_index = 0;
        self.followed_phase = None;
        self.reset_scroll();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.input_error = None;
        self.clear_results();
    }
}
