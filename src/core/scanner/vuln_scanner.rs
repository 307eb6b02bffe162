// src/core/scanner/vuln_scanner.rs

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::headers_scanner::{Verdict, analyze_disclosure, analyze_frame_protection, analyze_security_headers};
use super::ssl_scanner::{analyze_certificate, fetch_certificate};
use super::{Probe, unsupported, with_timeout};
use crate::core::error::ProbeError;
use crate::core::knowledge_base::{Candidate, CheckKind};
use crate::core::models::{FindingKind, Phase, RiskTier};
use crate::core::target::Target;

// Error signatures of the common database drivers leaking through a page.
static RE_SQL_ERRORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(you have an error in your sql syntax|warning: mysql_|mysqli?_fetch|unclosed quotation mark|quoted string not properly terminated|pg_query\(\)|postgresql.*error|sqlite3?::|sqlstate\[|ora-\d{5})",
    )
    .unwrap()
});
static RE_CSRF_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)csrf|xsrf|token|authenticity|nonce").unwrap());

const XSS_MARKER: &str = "bf7331<script>alert(7331)</script>";

/// A fetched page: where it ended up, its headers and its body.
struct Page {
    url: Url,
    headers: HeaderMap,
    body: String,
}

/// Runs one web-application heuristic per vulnerability check.
pub struct VulnerabilityProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl VulnerabilityProbe {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self { client, timeout })
    }

    async fn fetch(&self, url: Url) -> Result<Page, ProbeError> {
        let response = self.client.get(url).send().await?;
        let url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.text().await?;
        debug!(url = %url, bytes = body.len(), "Fetched page.");
        Ok(Page { url, headers, body })
    }

    /// The landing page over HTTPS, falling back to plain HTTP.
    async fn landing_page(&self, target: &Target) -> Result<Page, ProbeError> {
        match self.fetch(base_url(target, "https")?).await {
            Ok(page) => Ok(page),
            Err(e) => {
                debug!(target = %target, error = %e, "HTTPS unavailable, retrying over HTTP.");
                self.fetch(base_url(target, "http")?).await
            }
        }
    }

    async fn check_sql_injection(&self, target: &Target) -> Result<Verdict, ProbeError> {
        let baseline = self.landing_page(target).await?;
        let mut url = baseline.url.clone();
        url.query_pairs_mut().append_pair("id", "1'");
        let injected = self.fetch(url).await?;
        Ok(analyze_sql_errors(&baseline.body, &injected.body))
    }

    async fn check_reflection(&self, target: &Target) -> Result<Verdict, ProbeError> {
        let mut url = self.landing_page(target).await?.url;
        url.query_pairs_mut().append_pair("q", XSS_MARKER);
        let page = self.fetch(url).await?;
        Ok(analyze_reflection(&page.body))
    }

    async fn check_authentication(&self, target: &Target) -> Result<Verdict, ProbeError> {
        let landing = self.landing_page(target).await?;
        if let Some(verdict) = analyze_login_transport(&landing.url, &landing.body) {
            return Ok(Some(verdict));
        }
        let login = self.fetch(landing.url.join("/login")?).await?;
        Ok(analyze_login_transport(&login.url, &login.body))
    }

    async fn check_tls(&self, target: &Target) -> Result<Verdict, ProbeError> {
        let fetched = fetch_certificate(target.as_str(), self.timeout).await;
        match fetched {
            Ok(info) => Ok(analyze_certificate(&info, Utc::now())),
            Err(ProbeError::Tls(reason)) => Ok(Some((RiskTier::Critical, format!("TLS handshake failed: {reason}")))),
            Err(e) => Err(e),
        }
    }

    async fn run_check(&self, kind: CheckKind, target: &Target) -> Result<Verdict, ProbeError> {
        Ok(match kind {
            CheckKind::SqlInjection => self.check_sql_injection(target).await?,
            CheckKind::CrossSiteScripting => self.check_reflection(target).await?,
            CheckKind::RequestForgery => analyze_forms(&self.landing_page(target).await?.body),
            CheckKind::SecurityHeaders => analyze_security_headers(&self.landing_page(target).await?.headers),
            CheckKind::TlsConfiguration => self.check_tls(target).await?,
            CheckKind::InformationDisclosure => analyze_disclosure(&self.landing_page(target).await?.headers),
            CheckKind::Authentication => self.check_authentication(target).await?,
            CheckKind::Clickjacking => analyze_frame_protection(&self.landing_page(target).await?.headers),
        })
    }
}

#[async_trait]
impl Probe for VulnerabilityProbe {
    fn phase(&self) -> Phase {
        Phase::Vulnerabilities
    }

    async fn probe(&self, candidate: &Candidate, target: &Target) -> Result<Option<FindingKind>, ProbeError> {
        let Candidate::Check(check) = candidate else {
            return Err(unsupported(self.phase(), candidate));
        };
        info!(target = %target, check = %check.kind, "Running vulnerability check.");

        // One budget for the whole check, however many requests it chains.
        let verdict = with_timeout(self.timeout, self.run_check(check.kind, target)).await?;

        Ok(verdict.map(|(risk, description)| FindingKind::Vulnerability {
            name: check.name.to_string(),
            description,
            risk,
        }))
    }
}

fn base_url(target: &Target, scheme: &str) -> Result<Url, ProbeError> {
    Ok(Url::parse(&format!("{scheme}://{target}/"))?)
}

// --- Page Heuristics ---

/// A database error that only appears once a quote is injected.
pub fn analyze_sql_errors(baseline: &str, injected: &str) -> Verdict {
    if RE_SQL_ERRORS.is_match(baseline) {
        return None;
    }
    RE_SQL_ERRORS.find(injected).map(|m| {
        (RiskTier::Critical, format!("Database error exposed after quote injection: \"{}\"", m.as_str()))
    })
}

/// The script payload echoed back without encoding.
pub fn analyze_reflection(body: &str) -> Verdict {
    body.contains(XSS_MARKER)
        .then(|| (RiskTier::Critical, "Query parameter reflected without HTML encoding".to_string()))
}

/// POST forms that carry no anti-forgery token field.
pub fn analyze_forms(body: &str) -> Verdict {
    let document = Html::parse_document(body);
    let (Ok(forms), Ok(inputs)) = (Selector::parse("form"), Selector::parse("input[name]")) else {
        return None;
    };

    let unprotected = document
        .select(&forms)
        .filter(|form| {
            form.value()
                .attr("method")
                .is_some_and(|m| m.eq_ignore_ascii_case("post"))
        })
        .filter(|form| {
            !form
                .select(&inputs)
                .filter_map(|input| input.value().attr("name"))
                .any(|name| RE_CSRF_FIELD.is_match(name))
        })
        .count();

    (unprotected > 0).then(|| {
        (RiskTier::Warning, format!("{unprotected} POST form(s) without an anti-forgery token"))
    })
}

/// A password field served over plain HTTP.
pub fn analyze_login_transport(url: &Url, body: &str) -> Verdict {
    if url.scheme() == "https" {
        return None;
    }
    let document = Html::parse_document(body);
    let Ok(password) = Selector::parse("input[type=password]") else {
        return None;
    };
    document.select(&password).next().map(|_| {
        (RiskTier::Critical, format!("Login form at {url} submits credentials over plain HTTP"))
    })
}
