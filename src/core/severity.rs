// src/core/severity.rs

//! The severity policy. A pure mapping from a finding to its severity tag,
//! applied exactly once when the finding is created.

use crate::core::models::{FindingKind, RiskTier, Severity};

/// Ports whose exposure warrants a warning.
pub const RISKY_PORTS: &[u16] = &[21, 23, 3306, 5432];

/// Paths whose exposure is critical. Any other accessible path is a warning.
pub const CRITICAL_PATHS: &[&str] = &["/.git", "/.env", "/backup", "/backups", "/.htaccess"];

pub fn classify(kind: &FindingKind) -> Severity {
    match kind {
        FindingKind::Subdomain { .. } => Severity::Success,
        FindingKind::Port { port, .. } if RISKY_PORTS.contains(port) => Severity::Warning,
        FindingKind::Port { .. } => Severity::Success,
        FindingKind::Path { path, .. } if CRITICAL_PATHS.contains(&path.as_str()) => Severity::Critical,
        FindingKind::Path { .. } => Severity::Warning,
        FindingKind::Vulnerability { risk, .. } => match risk {
            RiskTier::Critical => Severity::Critical,
            RiskTier::Warning => Severity::Warning,
            RiskTier::Info => Severity::Info,
        },
    }
}
