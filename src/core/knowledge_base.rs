//! Static, read-only scan intelligence: the candidate lists each phase walks
//! through, the vulnerability checks and the advisories attached to findings
//! that deserve an extra explanation.
//!
//! Keeping this data-driven means candidate lists can be replaced from the
//! configuration file without touching the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use strum::{Display, EnumIter};

use crate::core::error::ScanError;
use crate::core::models::{Phase, Severity};
use crate::core::target::is_valid_label;

// --- Default Candidate Lists ---

pub static SUBDOMAIN_LABELS: &[&str] = &[
    "www", "mail", "ftp", "webmail", "smtp", "pop", "ns1", "ns2",
    "cpanel", "whm", "autodiscover", "autoconfig", "dev", "staging",
    "test", "api", "admin", "blog", "shop", "forum", "help", "support",
    "mobile", "app", "m", "cdn", "assets", "static",
];

pub static COMMON_PORTS: &[(u16, &str)] = &[
    (21, "FTP (File Transfer)"),
    (22, "SSH (Secure Shell)"),
    (23, "Telnet"),
    (25, "SMTP (Email)"),
    (53, "DNS"),
    (80, "HTTP (Website)"),
    (110, "POP3 (Email)"),
    (143, "IMAP (Email)"),
    (443, "HTTPS (Secure Website)"),
    (3306, "MySQL Database"),
    (3389, "Remote Desktop"),
    (5432, "PostgreSQL Database"),
    (8080, "HTTP Alternative"),
    (8443, "HTTPS Alternative"),
];

pub static SENSITIVE_PATHS: &[&str] = &[
    "/admin", "/administrator", "/login", "/wp-admin", "/phpmyadmin",
    "/backup", "/backups", "/.git", "/.env", "/config", "/api",
    "/test", "/dev", "/robots.txt", "/sitemap.xml", "/.htaccess",
    "/wp-config.php", "/config.php", "/database.sql", "/.DS_Store",
    "/debug", "/temp", "/tmp", "/uploads", "/files", "/documents",
];

// --- Vulnerability Checks ---

/// The heuristic a vulnerability check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CheckKind {
    SqlInjection,
    CrossSiteScripting,
    RequestForgery,
    SecurityHeaders,
    TlsConfiguration,
    InformationDisclosure,
    Authentication,
    Clickjacking,
}

/// A vulnerability check descriptor: what is tested and how it is described.
#[derive(Debug, PartialEq, Eq)]
pub struct VulnCheck {
    pub kind: CheckKind,
    pub name: &'static str,
    pub description: &'static str,
}

pub static VULNERABILITY_CHECKS: &[VulnCheck] = &[
    VulnCheck { kind: CheckKind::SqlInjection, name: "SQL Injection", description: "Trying to inject database commands" },
    VulnCheck { kind: CheckKind::CrossSiteScripting, name: "XSS (Cross-Site Scripting)", description: "Testing if site accepts malicious scripts" },
    VulnCheck { kind: CheckKind::RequestForgery, name: "CSRF (Cross-Site Request Forgery)", description: "Checking request protection" },
    VulnCheck { kind: CheckKind::SecurityHeaders, name: "Security Headers", description: "Verifying protective HTTP headers" },
    VulnCheck { kind: CheckKind::TlsConfiguration, name: "SSL/TLS Configuration", description: "Testing encryption strength" },
    VulnCheck { kind: CheckKind::InformationDisclosure, name: "Information Disclosure", description: "Looking for leaked sensitive info" },
    VulnCheck { kind: CheckKind::Authentication, name: "Authentication Issues", description: "Testing login security" },
    VulnCheck { kind: CheckKind::Clickjacking, name: "Clickjacking Protection", description: "Checking frame protection" },
];

// --- Advisories ---

/// An extra line of guidance shown under a finding in the live progress output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advisory {
    pub text: &'static str,
    pub severity: Severity,
}

pub fn port_advisory(port: u16) -> Option<Advisory> {
    match port {
        23 => Some(Advisory {
            text: "Telnet is insecure - should use SSH instead!",
            severity: Severity::Critical,
        }),
        3306 | 5432 => Some(Advisory {
            text: "Database port exposed - verify it's protected",
            severity: Severity::Warning,
        }),
        _ => None,
    }
}

pub fn path_advisory(path: &str) -> Option<Advisory> {
    match path {
        "/.git" => Some(Advisory {
            text: "Exposed Git repository - source code may be leaked!",
            severity: Severity::Critical,
        }),
        "/.env" => Some(Advisory {
            text: "Environment file exposed - may contain passwords!",
            severity: Severity::Critical,
        }),
        _ => None,
    }
}

// --- Candidates ---

/// A port to probe together with the service normally listening on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortCandidate {
    pub port: u16,
    pub service: String,
}

/// One concrete item probed within a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Subdomain(String),
    Port(PortCandidate),
    Path(String),
    Check(&'static VulnCheck),
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Subdomain(label) => f.write_str(label),
            Candidate::Port(p) => write!(f, "Port {} ({})", p.port, p.service),
            Candidate::Path(path) => f.write_str(path),
            Candidate::Check(check) => f.write_str(check.name),
        }
    }
}

/// The candidate lists for one orchestrator. Defaults come from the static tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    pub subdomains: Vec<String>,
    pub ports: Vec<PortCandidate>,
    pub paths: Vec<String>,
    pub checks: Vec<&'static VulnCheck>,
}

impl Default for CandidateSet {
    fn default() -> Self {
        Self {
            subdomains: SUBDOMAIN_LABELS.iter().map(|s| s.to_string()).collect(),
            ports: COMMON_PORTS
                .iter()
                .map(|(port, service)| PortCandidate { port: *port, service: service.to_string() })
                .collect(),
            paths: SENSITIVE_PATHS.iter().map(|s| s.to_string()).collect(),
            checks: VULNERABILITY_CHECKS.iter().collect(),
        }
    }
}

impl CandidateSet {
    /// The ordered candidates a phase walks through.
    pub fn for_phase(&self, phase: Phase) -> Vec<Candidate> {
        match phase {
            Phase::Subdomains => self.subdomains.iter().cloned().map(Candidate::Subdomain).collect(),
            Phase::Ports => self.ports.iter().cloned().map(Candidate::Port).collect(),
            Phase::Directories => self.paths.iter().cloned().map(Candidate::Path).collect(),
            Phase::Vulnerabilities => self.checks.iter().copied().map(Candidate::Check).collect(),
        }
    }

    /// Rejects malformed candidate data. A failure here is fatal to a run.
    pub fn validate(&self) -> Result<(), ScanError> {
        if let Some(label) = self.subdomains.iter().find(|l| !is_valid_label(l)) {
            return Err(ScanError::Candidates(format!("'{label}' is not a valid subdomain label")));
        }

        let mut seen = HashSet::new();
        for candidate in &self.ports {
            if candidate.port == 0 {
                return Err(ScanError::Candidates("port 0 cannot be probed".to_string()));
            }
            if !seen.insert(candidate.port) {
                return Err(ScanError::Candidates(format!("port {} is listed twice", candidate.port)));
            }
        }

        if let Some(path) = self
            .paths
            .iter()
            .find(|p| !p.starts_with('/') || p.chars().any(char::is_whitespace))
        {
            return Err(ScanError::Candidates(format!("'{path}' must be an absolute path without whitespace")));
        }

        Ok(())
    }
}
