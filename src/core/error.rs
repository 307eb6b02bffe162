// src/core/error.rs

use std::time::Duration;
use thiserror::Error;

use crate::core::models::Phase;

/// Raised when a raw target string is rejected before a run is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please enter a target domain")]
    Empty,

    #[error("'{input}' is not a valid domain name ({reason})")]
    Malformed { input: String, reason: &'static str },
}

/// A single probe's failure. Recoverable: the candidate is skipped.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("DNS error: {0}")]
    Dns(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("{phase} probe cannot handle candidate '{candidate}'")]
    Unsupported { phase: Phase, candidate: String },
}

/// Errors that keep a scan from starting.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a scan is already running")]
    AlreadyRunning,

    #[error("invalid candidate list: {0}")]
    Candidates(String),
}

/// Errors raised while handing a report to durable storage.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
