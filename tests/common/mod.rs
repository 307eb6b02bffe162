// Deterministic probes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bountyforge_rs::config::ScanSettings;
use bountyforge_rs::core::knowledge_base::{Candidate, CandidateSet, PortCandidate, VULNERABILITY_CHECKS};
use bountyforge_rs::core::models::RiskTier;
use bountyforge_rs::core::target::Target;
use bountyforge_rs::{FindingKind, Orchestrator, Phase, Probe, ProbeError, ProbeSet, StopHandle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Clone)]
pub enum Outcome {
    Found,
    Fail,
}

/// Answers from a fixed table keyed by the candidate's display text.
/// Unlisted candidates are "not present".
#[derive(Default)]
pub struct ScriptedProbe {
    phase: Option<Phase>,
    outcomes: HashMap<String, Outcome>,
    calls: Arc<Mutex<Vec<String>>>,
    completions: Arc<Mutex<Vec<String>>>,
    delays: HashMap<String, Duration>,
    stop_on: Option<(String, Arc<OnceLock<StopHandle>>)>,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl ScriptedProbe {
    pub fn new(phase: Phase) -> Self {
        Self { phase: Some(phase), ..Default::default() }
    }

    pub fn found(mut self, candidate: &str) -> Self {
        self.outcomes.insert(candidate.to_string(), Outcome::Found);
        self
    }

    pub fn failing(mut self, candidate: &str) -> Self {
        self.outcomes.insert(candidate.to_string(), Outcome::Fail);
        self
    }

    /// Makes `candidate` answer only after `delay`.
    pub fn delayed(mut self, candidate: &str, delay: Duration) -> Self {
        self.delays.insert(candidate.to_string(), delay);
        self
    }

    /// Requests a stop while probing `candidate`.
    pub fn stop_on(mut self, candidate: &str, handle: Arc<OnceLock<StopHandle>>) -> Self {
        self.stop_on = Some((candidate.to_string(), handle));
        self
    }

    /// Signals `entered` on every call, then waits for `release`.
    pub fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }

    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

fn finding_for(candidate: &Candidate, target: &Target) -> FindingKind {
    match candidate {
        Candidate::Subdomain(label) => FindingKind::Subdomain { name: target.host_for(label) },
        Candidate::Port(p) => FindingKind::Port { port: p.port, service: p.service.clone() },
        Candidate::Path(path) => FindingKind::Path { path: path.clone(), url: format!("https://{target}{path}") },
        Candidate::Check(check) => FindingKind::Vulnerability {
            name: check.name.to_string(),
            description: check.description.to_string(),
            risk: RiskTier::Warning,
        },
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn phase(&self) -> Phase {
        self.phase.unwrap_or(Phase::Subdomains)
    }

    async fn probe(&self, candidate: &Candidate, target: &Target) -> Result<Option<FindingKind>, ProbeError> {
        let key = candidate.to_string();
        self.calls.lock().unwrap().push(key.clone());

        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        if let Some((on, handle)) = &self.stop_on {
            if *on == key {
                let handle = handle.get().expect("stop handle installed");
                handle.stop();
                handle.stop();
            }
        }

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        self.completions.lock().unwrap().push(key.clone());

        match self.outcomes.get(&key) {
            Some(Outcome::Found) => Ok(Some(finding_for(candidate, target))),
            Some(Outcome::Fail) => Err(ProbeError::Dns(format!("no answer for {key}"))),
            None => Ok(None),
        }
    }
}

pub struct Fixture {
    pub probes: [Arc<ScriptedProbe>; 4],
}

impl Fixture {
    pub fn new(subdomains: ScriptedProbe, ports: ScriptedProbe, paths: ScriptedProbe, checks: ScriptedProbe) -> Self {
        Self { probes: [Arc::new(subdomains), Arc::new(ports), Arc::new(paths), Arc::new(checks)] }
    }

    pub fn quiet() -> Self {
        Self::new(
            ScriptedProbe::new(Phase::Subdomains),
            ScriptedProbe::new(Phase::Ports),
            ScriptedProbe::new(Phase::Directories),
            ScriptedProbe::new(Phase::Vulnerabilities),
        )
    }

    pub fn probe_set(&self) -> ProbeSet {
        let [s, p, d, v] = &self.probes;
        ProbeSet::new(s.clone(), p.clone(), d.clone(), v.clone())
    }

    pub fn calls(&self, phase: Phase) -> Vec<String> {
        self.probes[phase.index()].calls.lock().unwrap().clone()
    }

    /// Candidates in the order their probes answered.
    pub fn completions(&self, phase: Phase) -> Vec<String> {
        self.probes[phase.index()].completions.lock().unwrap().clone()
    }

    pub fn orchestrator(&self, candidates: CandidateSet, concurrency: usize) -> Orchestrator {
        let settings = ScanSettings { concurrency, ..Default::default() };
        Orchestrator::new(self.probe_set(), candidates, &settings)
    }
}

/// Small candidate lists so call logs stay readable.
pub fn small_candidates() -> CandidateSet {
    CandidateSet {
        subdomains: vec!["www".to_string(), "mail".to_string(), "dev".to_string()],
        ports: [(22, "SSH"), (80, "HTTP"), (443, "HTTPS"), (8080, "HTTP-Alt")]
            .into_iter()
            .map(|(port, service)| PortCandidate { port, service: service.to_string() })
            .collect(),
        paths: vec!["/admin".to_string(), "/.env".to_string(), "/backup".to_string()],
        checks: VULNERABILITY_CHECKS.iter().take(2).collect(),
    }
}
