// src/core/report.rs

//! Report generation and persistence.
//!
//! A `Report` is an immutable snapshot of a finished `ScanRun`. Apart from the
//! `generated_at` stamp, its rendering depends only on the run's state.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::config::ReportFormat;
use crate::core::error::ReportError;
use crate::core::models::{Finding, Phase, ProbeFailure, ScanState, Severity};
use crate::core::orchestrator::ScanRun;

pub const TOOL_NAME: &str = "BountyForge RS";
const RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseCount {
    pub phase: Phase,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub counts: Vec<PhaseCount>,
    pub critical: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub text: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub phase: Phase,
    pub heading: &'static str,
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub target: String,
    pub generated_at: DateTime<Local>,
    pub tool: String,
    pub status: ScanState,
    pub summary: ReportSummary,
    pub sections: Vec<ReportSection>,
    pub indeterminate: Vec<ProbeFailure>,
}

impl Report {
    /// Snapshots `run`, stamped with the current local time.
    pub fn generate(run: &ScanRun) -> Self {
        Self::generate_at(run, Local::now())
    }

    pub fn generate_at(run: &ScanRun, generated_at: DateTime<Local>) -> Self {
        let store = run.store();
        let counts = Phase::in_order()
            .map(|phase| PhaseCount { phase, label: phase.summary_label(), count: store.count_by(phase) })
            .collect();

        let sections = Phase::in_order()
            .filter(|phase| store.count_by(*phase) > 0)
            .map(|phase| ReportSection {
                phase,
                heading: phase.report_heading(),
                entries: store.findings(phase).iter().map(entry_for).collect(),
            })
            .collect();

        Self {
            target: run.target().to_string(),
            generated_at,
            tool: format!("{TOOL_NAME} v{}", env!("CARGO_PKG_VERSION")),
            status: run.state(),
            summary: ReportSummary {
                counts,
                critical: store.critical_count(),
                warnings: store.warning_count(),
            },
            sections,
            indeterminate: run.failures().to_vec(),
        }
    }

    /// The plain-text rendering written to disk.
    pub fn render_text(&self) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let mut out = String::new();

        // `write!` into a String cannot fail.
        let _ = writeln!(out, "{heavy}\nBOUNTYFORGE SECURITY SCAN REPORT\n{heavy}\n");
        let _ = writeln!(out, "Target: {}", self.target);
        let _ = writeln!(out, "Date: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "Tool: {}", self.tool);
        let _ = writeln!(out, "Status: {}\n", self.status);

        let _ = writeln!(out, "SUMMARY\n{light}");
        for count in &self.summary.counts {
            let _ = writeln!(out, "{}: {}", count.label, count.count);
        }
        let _ = writeln!(out, "Critical Issues: {}", self.summary.critical);
        let _ = writeln!(out, "Warnings: {}\n", self.summary.warnings);

        for section in &self.sections {
            let _ = writeln!(out, "{}\n{light}", section.heading);
            for entry in &section.entries {
                let _ = writeln!(out, "• {} [{}]", entry.text, entry.severity);
            }
            out.push('\n');
        }

        if !self.indeterminate.is_empty() {
            let _ = writeln!(out, "INDETERMINATE CHECKS\n{light}");
            for failure in &self.indeterminate {
                let _ = writeln!(out, "• [{}] {}: {}", failure.phase, failure.candidate, failure.reason);
            }
            out.push('\n');
        }

        let _ = writeln!(out, "{heavy}\nEND OF REPORT\n{heavy}");
        out
    }

    pub fn render_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// File name stem, e.g. `bountyforge_report_2026-10-16T09-30-00`.
    pub fn file_stem(&self) -> String {
        format!("bountyforge_report_{}", self.generated_at.format("%Y-%m-%dT%H-%M-%S"))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_text())
    }
}

fn entry_for(finding: &Finding) -> ReportEntry {
    ReportEntry { text: finding.summary(), severity: finding.severity() }
}

// --- Persistence ---

/// Durable storage for finished reports.
pub trait ReportSink {
    /// Stores `report` under `name` and returns where it ended up.
    fn persist(&self, report: &Report, name: &str) -> Result<PathBuf, ReportError>;
}

/// Writes reports as files into a directory.
pub struct FileReportSink {
    directory: PathBuf,
    format: ReportFormat,
}

impl FileReportSink {
    pub fn new(directory: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self { directory: directory.into(), format }
    }

    /// Persists the report under its timestamped default name.
    pub fn save(&self, report: &Report) -> Result<PathBuf, ReportError> {
        self.persist(report, &report.file_stem())
    }
}

impl ReportSink for FileReportSink {
    fn persist(&self, report: &Report, name: &str) -> Result<PathBuf, ReportError> {
        let (contents, extension) = match self.format {
            ReportFormat::Text => (report.render_text(), "txt"),
            ReportFormat::Json => (report.render_json()?, "json"),
        };
        let path = self.directory.join(format!("{name}.{extension}"));
        let write_error = |source| ReportError::Write { path: path.display().to_string(), source };

        fs::create_dir_all(&self.directory).map_err(write_error)?;
        fs::write(&path, contents).map_err(write_error)?;
        info!(path = %path.display(), "Report saved.");
        Ok(path)
    }
}
