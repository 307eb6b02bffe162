// src/main.rs

use bountyforge_rs::config::Settings;
use bountyforge_rs::logging::initialize_logging;
use bountyforge_rs::{FileReportSink, Orchestrator, Phase, ProbeSet, ProgressEvent, Report, ScanError, ScanRun};
use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

mod app;
mod ui;

use app::{App, AppState, ExportStatus};

type ScanResult = Result<ScanRun, ScanError>;

/// Everything the event loop needs besides the app state.
struct Runtime {
    settings: Settings,
    orchestrator: Arc<Orchestrator>,
    events: mpsc::UnboundedReceiver<ProgressEvent>,
    done_tx: mpsc::Sender<ScanResult>,
    done_rx: mpsc::Receiver<ScanResult>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let log_path = initialize_logging()?;
    let settings = Settings::load()?;
    info!(log = %log_path.display(), "Starting {}.", env!("CARGO_PKG_NAME"));

    let candidates = settings.candidate_set();
    candidates.validate()?;
    let probes = ProbeSet::network(&settings.scan)?;

    let (event_tx, events) = mpsc::unbounded_channel();
    let orchestrator = Arc::new(Orchestrator::new(probes, candidates, &settings.scan).with_events(event_tx));
    let (done_tx, done_rx) = mpsc::channel(1);
    let mut app = App::new(settings.options);
    let mut runtime = Runtime { settings, orchestrator, events, done_tx, done_rx };

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let outcome = run_loop(&mut terminal, &mut app, &mut runtime).await;

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    runtime.orchestrator.stop();
    info!("Exiting.");
    outcome
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    runtime: &mut Runtime,
) -> Result<()> {
    while !app.should_quit {
        while let Ok(event) = runtime.events.try_recv() {
            app.push_event(event);
        }
        if let Ok(result) = runtime.done_rx.try_recv() {
            while let Ok(event) = runtime.events.try_recv() {
                app.push_event(event);
            }
            app.finish_scan(result);
        }

        app.on_tick();
        terminal.draw(|frame| ui::render(app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(app, runtime)?;
        }
    }
    Ok(())
}

fn handle_events(app: &mut App, runtime: &Runtime) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if app.show_disclaimer {
            match key.code {
                KeyCode::Enter => app.show_disclaimer = false,
                KeyCode::Esc => app.quit(),
                _ => {}
            }
            return Ok(());
        }
        match app.state {
            AppState::Idle => handle_idle_input(app, key.code, runtime),
            AppState::Scanning => handle_scanning_input(app, key.code, runtime),
            AppState::Finished => handle_finished_input(app, key.code, runtime),
        }
    }
    Ok(())
}

/// Shared navigation keys. Returns whether the key was consumed.
fn handle_navigation(app: &mut App, key_code: KeyCode) -> bool {
    match key_code {
        KeyCode::Tab | KeyCode::Right => app.next_tab(),
        KeyCode::BackTab | KeyCode::Left => app.previous_tab(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => return false,
    }
    true
}

fn handle_idle_input(app: &mut App, key_code: KeyCode, runtime: &Runtime) {
    if handle_navigation(app, key_code) {
        return;
    }
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::F(n @ 1..=4) => {
            if let Some(phase) = Phase::in_order().nth(usize::from(n) - 1) {
                app.toggle_option(phase);
            }
        }
        KeyCode::Char(c) => {
            app.input.push(c);
            app.input_error = None;
        }
        KeyCode::Backspace => {
            app.input.pop();
            app.input_error = None;
        }
        KeyCode::Enter => {
            let Ok(target) = app.begin_scan() else {
                return;
            };
            let orchestrator = Arc::clone(&runtime.orchestrator);
            let done_tx = runtime.done_tx.clone();
            let options = app.options;
            tokio::spawn(async move {
                let result = orchestrator.start(target.as_str(), options).await;
                // The receiver only closes when the app is quitting.
                let _ = done_tx.send(result).await;
            });
        }
        _ => {}
    }
}

fn handle_scanning_input(app: &mut App, key_code: KeyCode, runtime: &Runtime) {
    if handle_navigation(app, key_code) {
        return;
    }
    if key_code == KeyCode::Esc {
        runtime.orchestrator.stop_handle().stop();
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode, runtime: &Runtime) {
    if handle_navigation(app, key_code) {
        return;
    }
    match key_code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('e') => export_report(app, &runtime.settings),
        _ => {}
    }
}

fn export_report(app: &mut App, settings: &Settings) {
    let Some(run) = &app.scan_run else {
        return;
    };
    let sink = FileReportSink::new(settings.report.output_dir(), settings.report.format);
    app.export_status = match sink.save(&Report::generate(run)) {
        Ok(path) => ExportStatus::Success(path.display().to_string()),
        Err(e) => {
            error!(error = %e, "Report export failed.");
            ExportStatus::Error(e.to_string())
        }
    };
}
