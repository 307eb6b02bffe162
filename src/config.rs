//! Configuration for the scanner.
//!
//! Settings are read from a TOML file at `$BOUNTYFORGE_CONFIG` or
//! `<config dir>/config.toml`. A missing file yields the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::knowledge_base::{CandidateSet, PortCandidate};
use crate::core::models::ScanOptions;
use crate::logging::{get_config_dir, get_data_dir};

pub const CONFIG_ENV: &str = "BOUNTYFORGE_CONFIG";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Top-level settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scan: ScanSettings,
    /// Phases enabled when the application starts.
    pub options: ScanOptions,
    pub report: ReportSettings,
    pub candidates: CandidateOverrides,
}

/// Probe behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Per-probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
    /// How many candidates of one phase may be probed at once.
    pub concurrency: usize,
    pub user_agent: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 5_000,
            concurrency: 4,
            user_agent: format!("BountyForgeRS/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScanSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Where exported reports are written. Defaults to the data directory.
    pub directory: Option<PathBuf>,
    pub format: ReportFormat,
}

impl ReportSettings {
    pub fn output_dir(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| get_data_dir().join("reports"))
    }
}

/// Optional replacements for the built-in candidate lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateOverrides {
    pub subdomains: Option<Vec<String>>,
    pub ports: Option<Vec<PortCandidate>>,
    pub paths: Option<Vec<String>>,
}

impl Settings {
    /// Loads settings from the environment-selected or default location.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| get_config_dir().join(CONFIG_FILE));
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file found, using defaults.");
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let settings: Self =
            toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        settings.validate()?;
        tracing::info!(path = %path.display(), "Loaded configuration.");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.probe_timeout_ms == 0 {
            return Err(ConfigError::Invalid("scan.probe_timeout_ms must be greater than zero".to_string()));
        }
        if self.scan.concurrency == 0 {
            return Err(ConfigError::Invalid("scan.concurrency must be at least 1".to_string()));
        }
        Ok(())
    }

    /// The candidate lists: built-in tables with any configured overrides applied.
    pub fn candidate_set(&self) -> CandidateSet {
        let mut set = CandidateSet::default();
        if let Some(subdomains) = &self.candidates.subdomains {
            set.subdomains = subdomains.clone();
        }
        if let Some(ports) = &self.candidates.ports {
            set.ports = ports.clone();
        }
        if let Some(paths) = &self.candidates.paths {
            set.paths = paths.clone();
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.scan.probe_timeout(), Duration::from_secs(5));
        assert_eq!(settings.options, ScanOptions::all());
        assert_eq!(settings.candidate_set(), CandidateSet::default());
    }

    #[test]
    fn parses_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[scan]
concurrency = 1

[options]
subdomains = false

[report]
format = "json"

[candidates]
paths = ["/admin", "/.env"]
ports = [{{ port = 8080, service = "Proxy" }}]
"#
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.scan.concurrency, 1);
        assert_eq!(settings.scan.probe_timeout_ms, 5_000);
        assert!(!settings.options.subdomains);
        assert!(settings.options.ports);
        assert_eq!(settings.report.format, ReportFormat::Json);

        let set = settings.candidate_set();
        assert_eq!(set.paths, vec!["/admin", "/.env"]);
        assert_eq!(set.ports, vec![PortCandidate { port: 8080, service: "Proxy".to_string() }]);
        assert_eq!(set.subdomains.len(), 28);
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[scan]\nconcurrency = 0").unwrap();
        assert!(matches!(Settings::from_file(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn reports_parse_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[scan\nconcurrency = ").unwrap();
        assert!(matches!(Settings::from_file(file.path()), Err(ConfigError::Parse { .. })));
    }
}
