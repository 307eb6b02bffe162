// src/core/scanner/path_scanner.rs

use async_trait::async_trait;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{Probe, unsupported};
use crate::core::error::ProbeError;
use crate::core::knowledge_base::Candidate;
use crate::core::models::{FindingKind, Phase};
use crate::core::target::Target;

/// Requests `http://{target}{path}` and reports the path when it answers 2xx.
///
/// Redirects are not followed: catch-all redirects to a login page would
/// otherwise make every path look accessible.
pub struct PathProbe {
    client: reqwest::Client,
}

impl PathProbe {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self { client })
    }
}

/// The URL a path candidate is requested at, as listed in reports.
pub fn path_url(target: &Target, path: &str) -> String {
    Url::parse(&format!("http://{target}"))
        .and_then(|base| base.join(path))
        .map(String::from)
        .unwrap_or_else(|_| format!("http://{target}{path}"))
}

#[async_trait]
impl Probe for PathProbe {
    fn phase(&self) -> Phase {
        Phase::Directories
    }

    async fn probe(&self, candidate: &Candidate, target: &Target) -> Result<Option<FindingKind>, ProbeError> {
        let Candidate::Path(path) = candidate else {
            return Err(unsupported(self.phase(), candidate));
        };
        let url = path_url(target, path);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        debug!(url = %url, status = %status, "Path probed.");

        Ok(status.is_success().then(|| FindingKind::Path { path: path.clone(), url }))
    }
}
