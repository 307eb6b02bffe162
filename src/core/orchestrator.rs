// src/core/orchestrator.rs

//! The scan orchestration engine.
//!
//! A run walks the enabled phases in fixed order. Within a phase, candidates
//! are probed through a bounded window and drained in candidate-list order,
//! so the result store never depends on which probe answered first.
//! Cancellation is cooperative: the token is polled before each phase and
//! before each candidate is dispatched.

use chrono::{DateTime, Local};
use futures::{StreamExt, future, stream};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ScanSettings;
use crate::core::error::ScanError;
use crate::core::knowledge_base::{Candidate, CandidateSet, path_advisory, port_advisory};
use crate::core::models::{
    Finding, FindingKind, Phase, ProbeFailure, ProgressEvent, ScanOptions, ScanState, Severity,
};
use crate::core::scanner::ProbeSet;
use crate::core::store::ResultStore;
use crate::core::target::Target;

// --- Scan Run ---

/// The aggregate for one Start/Stop cycle. Finalized before it leaves the orchestrator.
#[derive(Debug, Clone)]
pub struct ScanRun {
    target: Target,
    options: ScanOptions,
    started_at: DateTime<Local>,
    state: ScanState,
    store: ResultStore,
    failures: Vec<ProbeFailure>,
    duration: Duration,
}

impl ScanRun {
    pub fn new(target: Target, options: ScanOptions) -> Self {
        Self {
            target,
            options,
            started_at: Local::now(),
            state: ScanState::Running,
            store: ResultStore::new(),
            failures: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn options(&self) -> ScanOptions {
        self.options
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Candidates whose probe failed; their outcome is indeterminate.
    pub fn failures(&self) -> &[ProbeFailure] {
        &self.failures
    }

    /// Wall-clock time between start and finalization.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn append(&mut self, finding: Finding) {
        self.store.append(finding.phase(), finding);
    }

    pub fn record_failure(&mut self, failure: ProbeFailure) {
        self.failures.push(failure);
    }

    pub fn finalize(&mut self, state: ScanState, duration: Duration) {
        self.state = state;
        self.duration = duration;
    }
}

// --- Run Control ---

#[derive(Debug)]
struct RunControl {
    state: ScanState,
    token: CancellationToken,
}

/// Requests cancellation of whatever run the orchestrator is executing.
#[derive(Debug, Clone)]
pub struct StopHandle {
    control: Arc<Mutex<RunControl>>,
}

impl StopHandle {
    /// Sets the cancellation flag. A no-op unless a run is in progress.
    pub fn stop(&self) {
        let control = self.control.lock().unwrap_or_else(PoisonError::into_inner);
        if control.state == ScanState::Running && !control.token.is_cancelled() {
            info!("Stop requested, cancelling the running scan.");
            control.token.cancel();
        }
    }

    pub fn state(&self) -> ScanState {
        self.control.lock().unwrap_or_else(PoisonError::into_inner).state
    }
}

/// Holds the Running state for one `start`. Dropping it unfinished, as when
/// the caller abandons the `start` future, cancels the run and marks it Stopped.
struct RunGuard {
    control: Arc<Mutex<RunControl>>,
    token: CancellationToken,
    finished: bool,
}

impl RunGuard {
    fn finish(mut self, state: ScanState) {
        self.finished = true;
        self.control.lock().unwrap_or_else(PoisonError::into_inner).state = state;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("Scan abandoned before finishing, releasing the orchestrator.");
        self.token.cancel();
        self.control.lock().unwrap_or_else(PoisonError::into_inner).state = ScanState::Stopped;
    }
}

// --- Orchestrator ---

pub struct Orchestrator {
    probes: ProbeSet,
    candidates: CandidateSet,
    concurrency: usize,
    events: Option<UnboundedSender<ProgressEvent>>,
    control: StopHandle,
}

impl Orchestrator {
    pub fn new(probes: ProbeSet, candidates: CandidateSet, settings: &ScanSettings) -> Self {
        Self {
            probes,
            candidates,
            concurrency: settings.concurrency.max(1),
            events: None,
            control: StopHandle {
                control: Arc::new(Mutex::new(RunControl {
                    state: ScanState::Idle,
                    token: CancellationToken::new(),
                })),
            },
        }
    }

    /// Subscribes a presentation layer to the live progress stream.
    pub fn with_events(mut self, events: UnboundedSender<ProgressEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> ScanState {
        self.control.state()
    }

    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.control.clone()
    }

    /// Validates the target and executes every enabled phase in order.
    ///
    /// Validation and candidate errors leave the orchestrator state untouched.
    /// A start while another run is in progress is rejected.
    pub async fn start(&self, raw_target: &str, options: ScanOptions) -> Result<ScanRun, ScanError> {
        let target = Target::parse(raw_target)?;
        self.candidates.validate()?;
        let guard = self.begin()?;
        let token = guard.token.clone();

        let clock = Instant::now();
        let mut run = ScanRun::new(target, options);
        info!(target = %run.target(), phases = ?options.enabled_phases(), "Starting scan.");
        self.emit(ProgressEvent::overview(format!("🎯 Starting scan for: {}", run.target()), Severity::Info));
        self.emit(ProgressEvent::overview(
            format!("⏰ Started at: {}", run.started_at().format("%H:%M:%S")),
            Severity::Info,
        ));

        let mut interrupted = false;
        for phase in options.enabled_phases() {
            if token.is_cancelled() || !self.run_phase(phase, &mut run, &token).await {
                interrupted = true;
                break;
            }
        }

        // A stop that arrives after the last candidate was dispatched changes nothing.
        let state = if interrupted { ScanState::Stopped } else { ScanState::Completed };
        let duration = clock.elapsed();
        run.finalize(state, duration);
        guard.finish(state);

        info!(
            target = %run.target(),
            state = %state,
            findings = run.store().total(),
            failures = run.failures().len(),
            elapsed_ms = duration.as_millis() as u64,
            "Scan finished."
        );
        match state {
            ScanState::Stopped => self.emit(ProgressEvent::overview("⏹️ Scan stopped by user", Severity::Warning)),
            _ => self.emit(ProgressEvent::overview(
                format!("✅ Scan completed in {:.1}s", duration.as_secs_f64()),
                Severity::Success,
            )),
        }
        Ok(run)
    }

    /// Transitions to Running with a fresh cancellation token.
    fn begin(&self) -> Result<RunGuard, ScanError> {
        let mut control = self.control.control.lock().unwrap_or_else(PoisonError::into_inner);
        if control.state == ScanState::Running {
            warn!("Start rejected, a scan is already running.");
            return Err(ScanError::AlreadyRunning);
        }
        control.state = ScanState::Running;
        control.token = CancellationToken::new();
        Ok(RunGuard {
            control: Arc::clone(&self.control.control),
            token: control.token.clone(),
            finished: false,
        })
    }

    /// Probes every candidate of `phase`. Returns false when cancellation
    /// kept some candidates from being dispatched.
    async fn run_phase(&self, phase: Phase, run: &mut ScanRun, token: &CancellationToken) -> bool {
        let probe = self.probes.for_phase(phase);
        let candidates = self.candidates.for_phase(phase);
        let total = candidates.len();
        let target = run.target().clone();
        info!(phase = %phase, candidates = candidates.len(), "Phase started.");
        self.emit(ProgressEvent::overview(format!("{} Scanning {}...", phase_icon(phase), phase), Severity::Info));

        let mut outcomes = stream::iter(candidates)
            .take_while(|_| future::ready(!token.is_cancelled()))
            .map(|candidate| {
                let target = &target;
                async move {
                    let outcome = probe.probe(&candidate, target).await;
                    (candidate, outcome)
                }
            })
            .buffered(self.concurrency);

        let mut found = 0;
        let mut drained = 0;
        while let Some((candidate, outcome)) = outcomes.next().await {
            drained += 1;
            match outcome {
                Ok(Some(kind)) => {
                    found += 1;
                    let finding = Finding::new(kind);
                    self.announce(phase, &finding);
                    run.append(finding);
                }
                Ok(None) => {
                    debug!(phase = %phase, candidate = %candidate, "Nothing found.");
                    if let Candidate::Check(check) = &candidate {
                        self.emit(ProgressEvent::phase(phase, format!("✅ {}: secure", check.name), Severity::Success));
                    }
                }
                Err(e) => {
                    warn!(phase = %phase, candidate = %candidate, error = %e, "Probe failed, skipping candidate.");
                    self.emit(ProgressEvent::phase(phase, format!("❔ {candidate}: check failed ({e})"), Severity::Info));
                    run.record_failure(ProbeFailure { phase, candidate: candidate.to_string(), reason: e.to_string() });
                }
            }
        }

        info!(phase = %phase, found, probed = drained, "Phase finished.");
        self.emit(phase_total(phase, found));
        drained == total
    }

    /// Emits the progress lines for a new finding, plus any advisory it carries.
    fn announce(&self, phase: Phase, finding: &Finding) {
        let severity = finding.severity();
        let (tab_line, overview_line) = match finding.kind() {
            FindingKind::Subdomain { name } => (format!("✅ {name}"), format!("  Found: {name}")),
            FindingKind::Port { port, service } => {
                (format!("✅ Port {port} OPEN - {service}"), format!("  Port {port}: {service}"))
            }
            FindingKind::Path { path, url } if severity == Severity::Critical => {
                (format!("🚨 CRITICAL: {url}"), format!("  CRITICAL: {path}"))
            }
            FindingKind::Path { path, url } => (format!("⚠️ Found: {url}"), format!("  Found: {path}")),
            FindingKind::Vulnerability { name, description, .. } => {
                (format!("{} {name}: {description}", severity_icon(severity)), format!("  {severity}: {name}"))
            }
        };

        self.emit(ProgressEvent::finding(phase, tab_line, severity));
        self.emit(ProgressEvent::overview(overview_line, severity));

        let advisory = match finding.kind() {
            FindingKind::Port { port, .. } => port_advisory(*port),
            FindingKind::Path { path, .. } => path_advisory(path),
            _ => None,
        };
        if let Some(advisory) = advisory {
            self.emit(ProgressEvent::phase(phase, format!("   {}", advisory.text), advisory.severity));
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(events) = &self.events {
            // A closed receiver only means nobody is watching anymore.
            let _ = events.send(event);
        }
    }
}

fn phase_icon(phase: Phase) -> &'static str {
    match phase {
        Phase::Subdomains => "🔍",
        Phase::Ports => "🚪",
        Phase::Directories => "📁",
        Phase::Vulnerabilities => "🛡️",
    }
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🚨",
        Severity::Warning => "⚠️",
        Severity::Success => "✅",
        Severity::Info => "ℹ️",
    }
}

fn phase_total(phase: Phase, found: usize) -> ProgressEvent {
    if found > 0 {
        return ProgressEvent::phase(phase, format!("📊 Total found: {found}"), Severity::Info);
    }
    match phase {
        Phase::Subdomains => ProgressEvent::phase(phase, "❌ No common subdomains found", Severity::Info),
        Phase::Ports => ProgressEvent::phase(phase, "❌ No common ports found open", Severity::Info),
        Phase::Directories => {
            ProgressEvent::phase(phase, "✅ No sensitive paths found publicly accessible", Severity::Success)
        }
        Phase::Vulnerabilities => ProgressEvent::phase(phase, "✅ No vulnerabilities detected", Severity::Success),
    }
}
