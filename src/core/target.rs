// src/core/target.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::core::error::ValidationError;

static RE_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());
// Dot-separated labels of 1-63 alphanumerics with internal hyphens only.
static RE_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)*$").unwrap()
});
static RE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").unwrap());

const MAX_DOMAIN_LEN: usize = 253;

/// A validated domain name, stripped of scheme and trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Target(String);

impl Target {
    /// Cleans and validates free-text operator input.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        let without_scheme = RE_SCHEME.replace(trimmed, "");
        let cleaned = without_scheme
            .strip_suffix('/')
            .unwrap_or(&*without_scheme)
            .to_ascii_lowercase();

        let malformed = |reason| ValidationError::Malformed { input: trimmed.to_string(), reason };

        if cleaned.is_empty() {
            return Err(malformed("no host name"));
        }
        if cleaned.len() > MAX_DOMAIN_LEN {
            return Err(malformed("name longer than 253 characters"));
        }
        if cleaned.split('.').any(|label| label.len() > 63) {
            return Err(malformed("label longer than 63 characters"));
        }
        if !RE_DOMAIN.is_match(&cleaned) {
            return Err(malformed("expected dot-separated labels like example.com"));
        }

        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The fully-qualified name of a subdomain label under this target.
    pub fn host_for(&self, label: &str) -> String {
        format!("{label}.{}", self.0)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `label` is a single valid DNS label (used for subdomain candidates).
pub fn is_valid_label(label: &str) -> bool {
    RE_LABEL.is_match(label)
}
