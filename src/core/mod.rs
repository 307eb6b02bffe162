// src/core/mod.rs

// The scan engine: everything here is UI-agnostic and driven through
// `orchestrator::Orchestrator`.

/// Data structures shared across the engine: phases, severities, findings,
/// scan options and progress events.
pub mod models;

/// Error taxonomy for validation, probing, orchestration and persistence.
pub mod error;

/// Target validation.
pub mod target;

/// Static candidate lists, vulnerability checks and advisories.
pub mod knowledge_base;

pub mod severity;
pub mod store;

/// Probe capabilities, one per phase, and their network implementations.
pub mod scanner;

pub mod orchestrator;
pub mod report;
