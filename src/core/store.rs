// src/core/store.rs

use serde::Serialize;

use crate::core::models::{Finding, Phase, Severity};

/// Append-only, per-phase ordered findings plus the cross-phase rollup counters.
///
/// Critical and warning counters only include the directories and
/// vulnerabilities phases; open ports and subdomains are inventory, not issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultStore {
    phases: [Vec<Finding>; 4],
    critical: usize,
    warning: usize,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, phase: Phase, finding: Finding) {
        if phase.counts_toward_rollup() {
            match finding.severity() {
                Severity::Critical => self.critical += 1,
                Severity::Warning => self.warning += 1,
                _ => {}
            }
        }
        self.phases[phase.index()].push(finding);
    }

    pub fn findings(&self, phase: Phase) -> &[Finding] {
        &self.phases[phase.index()]
    }

    pub fn count_by(&self, phase: Phase) -> usize {
        self.phases[phase.index()].len()
    }

    pub fn critical_count(&self) -> usize {
        self.critical
    }

    pub fn warning_count(&self) -> usize {
        self.warning
    }

    pub fn total(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }
}
