// src/core/models.rs

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

// --- Phases & Severity ---

/// One of the four independent probing categories, declared in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[strum(serialize = "Subdomains")]
    Subdomains,
    #[strum(serialize = "Open Ports")]
    Ports,
    #[strum(serialize = "Accessible Paths")]
    Directories,
    #[strum(serialize = "Vulnerabilities")]
    Vulnerabilities,
}

impl Phase {
    /// All phases in the fixed order the orchestrator runs them.
    pub fn in_order() -> impl Iterator<Item = Phase> {
        Phase::iter()
    }

    /// Position of the phase in the run order, used to index per-phase storage.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Heading used for the phase's section in a rendered report.
    pub fn report_heading(self) -> &'static str {
        match self {
            Phase::Subdomains => "SUBDOMAINS",
            Phase::Ports => "OPEN PORTS",
            Phase::Directories => "ACCESSIBLE PATHS",
            Phase::Vulnerabilities => "VULNERABILITIES",
        }
    }

    /// Label used for the phase's counter in the report summary.
    pub fn summary_label(self) -> &'static str {
        match self {
            Phase::Subdomains => "Subdomains Found",
            Phase::Ports => "Open Ports",
            Phase::Directories => "Accessible Paths",
            Phase::Vulnerabilities => "Vulnerabilities",
        }
    }

    /// Whether findings of this phase feed the critical/warning rollup.
    pub fn counts_toward_rollup(self) -> bool {
        matches!(self, Phase::Directories | Phase::Vulnerabilities)
    }
}

/// Severity tag attached to every finding and progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Critical,
}

/// The risk tier a vulnerability check reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Info,
    Warning,
    Critical,
}

// --- Scan Options ---

/// Which phases a run executes. Every combination is legal, including none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub subdomains: bool,
    pub ports: bool,
    pub directories: bool,
    pub vulnerabilities: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::all()
    }
}

impl ScanOptions {
    pub fn all() -> Self {
        Self { subdomains: true, ports: true, directories: true, vulnerabilities: true }
    }

    pub fn none() -> Self {
        Self { subdomains: false, ports: false, directories: false, vulnerabilities: false }
    }

    /// Options with exactly the given phases enabled.
    pub fn only(phases: &[Phase]) -> Self {
        let mut options = Self::none();
        for phase in phases {
            options.set(*phase, true);
        }
        options
    }

    pub fn is_enabled(&self, phase: Phase) -> bool {
        match phase {
            Phase::Subdomains => self.subdomains,
            Phase::Ports => self.ports,
            Phase::Directories => self.directories,
            Phase::Vulnerabilities => self.vulnerabilities,
        }
    }

    pub fn set(&mut self, phase: Phase, enabled: bool) {
        match phase {
            Phase::Subdomains => self.subdomains = enabled,
            Phase::Ports => self.ports = enabled,
            Phase::Directories => self.directories = enabled,
            Phase::Vulnerabilities => self.vulnerabilities = enabled,
        }
    }

    pub fn toggle(&mut self, phase: Phase) {
        let enabled = self.is_enabled(phase);
        self.set(phase, !enabled);
    }

    /// Enabled phases, in run order.
    pub fn enabled_phases(&self) -> Vec<Phase> {
        Phase::in_order().filter(|p| self.is_enabled(*p)).collect()
    }
}

// --- Findings ---

/// The payload of a positive probe result, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingKind {
    Subdomain { name: String },
    Port { port: u16, service: String },
    Path { path: String, url: String },
    Vulnerability { name: String, description: String, risk: RiskTier },
}

impl FindingKind {
    /// The phase that produces this kind of finding.
    pub fn phase(&self) -> Phase {
        match self {
            FindingKind::Subdomain { .. } => Phase::Subdomains,
            FindingKind::Port { .. } => Phase::Ports,
            FindingKind::Path { .. } => Phase::Directories,
            FindingKind::Vulnerability { .. } => Phase::Vulnerabilities,
        }
    }
}

/// A classified finding. The severity is fixed when the finding is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    kind: FindingKind,
    severity: Severity,
}

impl Finding {
    /// Classifies `kind` and wraps it into an immutable finding.
    pub fn new(kind: FindingKind) -> Self {
        let severity = crate::core::severity::classify(&kind);
        Self { kind, severity }
    }

    pub fn kind(&self) -> &FindingKind {
        &self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn phase(&self) -> Phase {
        self.kind.phase()
    }

    /// One-line description used in progress output and reports.
    pub fn summary(&self) -> String {
        match &self.kind {
            FindingKind::Subdomain { name } => name.clone(),
            FindingKind::Port { port, service } => format!("Port {port}: {service}"),
            FindingKind::Path { url, .. } => url.clone(),
            FindingKind::Vulnerability { name, .. } => name.clone(),
        }
    }
}

// --- Run Lifecycle ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ScanState {
    Idle,
    Running,
    Completed,
    Stopped,
}

/// A probe that failed with an I/O error. The candidate is reported as indeterminate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeFailure {
    pub phase: Phase,
    pub candidate: String,
    pub reason: String,
}

/// A line of live progress output. `phase: None` addresses the overview stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Option<Phase>,
    pub text: String,
    pub severity: Severity,
    /// Set on the one line per phase tab that announces a new finding.
    pub finding: bool,
}

impl ProgressEvent {
    pub fn overview(text: impl Into<String>, severity: Severity) -> Self {
        Self { phase: None, text: text.into(), severity, finding: false }
    }

    pub fn phase(phase: Phase, text: impl Into<String>, severity: Severity) -> Self {
        Self { phase: Some(phase), text: text.into(), severity, finding: false }
    }

    pub fn finding(phase: Phase, text: impl Into<String>, severity: Severity) -> Self {
        Self { finding: true, ..Self::phase(phase, text, severity) }
    }
}
