// src/core/scanner/dns_scanner.rs

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Probe, unsupported, with_timeout};
use crate::core::error::ProbeError;
use crate::core::knowledge_base::Candidate;
use crate::core::models::{FindingKind, Phase};
use crate::core::target::Target;

/// Resolves `label.target` and reports the subdomain when any address comes back.
pub struct SubdomainProbe {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl SubdomainProbe {
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), opts);
        Self { resolver, timeout }
    }
}

#[async_trait]
impl Probe for SubdomainProbe {
    fn phase(&self) -> Phase {
        Phase::Subdomains
    }

    async fn probe(&self, candidate: &Candidate, target: &Target) -> Result<Option<FindingKind>, ProbeError> {
        let Candidate::Subdomain(label) = candidate else {
            return Err(unsupported(self.phase(), candidate));
        };
        let host = target.host_for(label);
        debug!(host = %host, "Resolving subdomain.");

        with_timeout(self.timeout, async {
            match self.resolver.lookup_ip(host.as_str()).await {
                Ok(lookup) => {
                    let found = lookup.iter().next().is_some();
                    debug!(host = %host, found, "Subdomain lookup finished.");
                    Ok(found.then(|| FindingKind::Subdomain { name: host.clone() }))
                }
                // NXDOMAIN and empty answers simply mean the name does not exist.
                Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Ok(None),
                Err(e) => {
                    warn!(host = %host, error = %e, "Subdomain lookup failed.");
                    Err(ProbeError::Dns(e.to_string()))
                }
            }
        })
        .await
    }
}
