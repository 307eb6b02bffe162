// src/lib.rs

pub mod config;
pub mod core;
pub mod logging;

pub use crate::config::Settings;
pub use crate::core::error::{ProbeError, ScanError, ValidationError};
pub use crate::core::models::{Finding, FindingKind, Phase, ProgressEvent, ScanOptions, ScanState, Severity};
pub use crate::core::orchestrator::{Orchestrator, ScanRun, StopHandle};
pub use crate::core::report::{FileReportSink, Report, ReportSink};
pub use crate::core::scanner::{Probe, ProbeSet};
