// src/core/scanner/headers_scanner.rs

//! Response-header heuristics shared by the vulnerability checks.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;
use tracing::{debug, warn};

use crate::core::models::RiskTier;

/// Headers whose absence weakens transport and content-type protection.
pub const PROTECTIVE_HEADERS: &[&str] = &[
    "strict-transport-security",
    "content-security-policy",
    "x-content-type-options",
];

static RE_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(\.\d+)*").unwrap());

/// A verdict from a header heuristic: the reported tier and a human-readable detail.
pub type Verdict = Option<(RiskTier, String)>;

/// Returns the value of a header, tolerating non-UTF-8 content.
pub fn check_header(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?;
    match value.to_str() {
        Ok(s) => {
            debug!(header_name = name, value = s, "Header found.");
            Some(s.to_string())
        }
        Err(_) => {
            warn!(header_name = name, "Header found but contained invalid UTF-8.");
            Some("[Invalid UTF-8]".to_string())
        }
    }
}

/// Missing protective headers: all missing is a warning, some missing is informational.
pub fn analyze_security_headers(headers: &HeaderMap) -> Verdict {
    let missing: Vec<&str> = PROTECTIVE_HEADERS
        .iter()
        .copied()
        .filter(|name| check_header(headers, name).is_none())
        .collect();

    if missing.is_empty() {
        return None;
    }
    let tier = if missing.len() == PROTECTIVE_HEADERS.len() { RiskTier::Warning } else { RiskTier::Info };
    Some((tier, format!("Missing headers: {}", missing.join(", "))))
}

/// No X-Frame-Options and no CSP `frame-ancestors` directive.
pub fn analyze_frame_protection(headers: &HeaderMap) -> Verdict {
    let has_xfo = check_header(headers, "x-frame-options").is_some();
    let has_frame_ancestors = check_header(headers, "content-security-policy")
        .is_some_and(|csp| csp.to_ascii_lowercase().contains("frame-ancestors"));

    if has_xfo || has_frame_ancestors {
        return None;
    }
    Some((
        RiskTier::Warning,
        "Pages can be framed by any origin (no X-Frame-Options or frame-ancestors)".to_string(),
    ))
}

/// Headers that leak server software or versions.
pub fn analyze_disclosure(headers: &HeaderMap) -> Verdict {
    let mut leaks = Vec::new();

    if let Some(server) = check_header(headers, "server") {
        if RE_VERSION.is_match(&server) {
            leaks.push(format!("Server: {server}"));
        }
    }
    for name in ["x-powered-by", "x-aspnet-version"] {
        if let Some(value) = check_header(headers, name) {
            leaks.push(format!("{name}: {value}"));
        }
    }

    if leaks.is_empty() {
        None
    } else {
        Some((RiskTier::Info, format!("Software versions disclosed ({})", leaks.join("; "))))
    }
}
