//! Turn-over-turn progress signal used for momentum and degraded mode.
//!
//! Mirrors `spec.md` §3 (`ProgressMetrics`, `DegradedModeData`) and §4.1
//! step 12/16.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestigationMomentum {
    Early,
    Accelerating,
    Steady,
    Stalled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressMetrics {
    pub turns_without_progress: u32,
    pub investigation_momentum: InvestigationMomentum,
    pub evidence_provided_count: u32,
    pub evidence_pending_count: u32,
    pub next_critical_steps: Vec<String>,
    pub is_degraded_mode: bool,
    pub generated_at_turn: u64,
}

/// State recorded while the investigation is in degraded mode
/// (`spec.md` §3, §4.1 step 16).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradedModeData {
    pub entered_at_turn: u64,
    pub reason: String,
    pub recovery_hints: Vec<String>,
}
