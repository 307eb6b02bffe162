// src/core/scanner/mod.rs

// Every phase is backed by one probe. The orchestrator only sees the `Probe`
// trait, so real network probes and deterministic test fakes are interchangeable.
pub mod dns_scanner;
pub mod headers_scanner;
pub mod path_scanner;
pub mod port_scanner;
pub mod ssl_scanner;
pub mod vuln_scanner;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ScanSettings;
use crate::core::error::ProbeError;
use crate::core::knowledge_base::Candidate;
use crate::core::models::{FindingKind, Phase};
use crate::core::target::Target;

use self::dns_scanner::SubdomainProbe;
use self::path_scanner::PathProbe;
use self::port_scanner::PortProbe;
use self::vuln_scanner::VulnerabilityProbe;

/// A pluggable capability that checks one candidate against a target.
///
/// `Ok(None)` means "not present". Implementations are expected to bound
/// their own latency; the orchestrator never times a probe out.
#[async_trait]
pub trait Probe: Send + Sync {
    /// The phase this probe serves.
    fn phase(&self) -> Phase;

    async fn probe(&self, candidate: &Candidate, target: &Target) -> Result<Option<FindingKind>, ProbeError>;
}

/// One probe per phase, injected into the orchestrator.
#[derive(Clone)]
pub struct ProbeSet {
    subdomains: Arc<dyn Probe>,
    ports: Arc<dyn Probe>,
    directories: Arc<dyn Probe>,
    vulnerabilities: Arc<dyn Probe>,
}

impl ProbeSet {
    pub fn new(
        subdomains: Arc<dyn Probe>,
        ports: Arc<dyn Probe>,
        directories: Arc<dyn Probe>,
        vulnerabilities: Arc<dyn Probe>,
    ) -> Self {
        Self { subdomains, ports, directories, vulnerabilities }
    }

    /// Builds the real DNS, TCP and HTTP probes from the scan settings.
    pub fn network(settings: &ScanSettings) -> Result<Self, ProbeError> {
        let timeout = settings.probe_timeout();
        Ok(Self::new(
            Arc::new(SubdomainProbe::new(timeout)),
            Arc::new(PortProbe::new(timeout)),
            Arc::new(PathProbe::new(timeout, &settings.user_agent)?),
            Arc::new(VulnerabilityProbe::new(timeout, &settings.user_agent)?),
        ))
    }

    pub fn for_phase(&self, phase: Phase) -> &dyn Probe {
        match phase {
            Phase::Subdomains => self.subdomains.as_ref(),
            Phase::Ports => self.ports.as_ref(),
            Phase::Directories => self.directories.as_ref(),
            Phase::Vulnerabilities => self.vulnerabilities.as_ref(),
        }
    }
}

/// Error returned when a probe is handed a candidate of another phase.
pub(crate) fn unsupported(phase: Phase, candidate: &Candidate) -> ProbeError {
    ProbeError::Unsupported { phase, candidate: candidate.to_string() }
}

/// Runs `fut` under the probe timeout, mapping expiry to `ProbeError::Timeout`.
pub(crate) async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, ProbeError>
where
    F: std::future::Future<Output = Result<T, ProbeError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(ProbeError::Timeout(timeout)))
}
