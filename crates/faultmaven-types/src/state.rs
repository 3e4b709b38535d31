//! `InvestigationState` — the engine's persisted root aggregate.
//!
//! Mirrors `spec.md` §3. Persisted as a JSON blob keyed by case id
//! (`spec.md` §6.3); `schema_version` plus the `extra` catch-all give
//! forward-compat on unknown fields per `SPEC_FULL.md` §10.5.

use crate::conclusion::WorkingConclusion;
use crate::evidence::Evidence;
use crate::hypothesis::{Hypothesis, HypothesisStatus};
use crate::memory::HierarchicalMemory;
use crate::milestones::Milestones;
use crate::phase::{OODAState, Phase};
use crate::progress::{DegradedModeData, ProgressMetrics};
use crate::turn::TurnRecord;
use serde::{Deserialize, Serialize};

/// Current schema version for the persisted blob. Bump when renaming or
/// removing a field that is part of the wire contract (`spec.md` §6.3).
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemporalState {
    Ongoing,
    Historical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    MitigationFirst,
    RootCause,
    UserChoice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub problem_statement: String,
    #[serde(default = "default_temporal_state")]
    pub temporal_state: TemporalState,
    #[serde(default = "default_urgency_level")]
    pub urgency_level: UrgencyLevel,
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,

    pub current_phase: Phase,

    #[serde(default)]
    pub hypotheses: Vec<Hypothesis>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub turn_history: Vec<TurnRecord>,
    #[serde(default)]
    pub milestones: Milestones,
    #[serde(default)]
    pub memory: HierarchicalMemory,
    #[serde(default)]
    pub ooda_state: Option<OODAState>,
    #[serde(default)]
    pub working_conclusion: Option<WorkingConclusion>,
    #[serde(default)]
    pub progress_metrics: Option<ProgressMetrics>,
    #[serde(default)]
    pub degraded_mode: Option<DegradedModeData>,
    #[serde(default)]
    pub loopback_count: u32,

    /// Set by anchoring mitigation, consumed by the next turn's prompt
    /// composition to ask for hypotheses outside the over-represented
    /// categories (`spec.md` §4.2 "Mitigation").
    #[serde(default)]
    pub diverse_categories_requested: bool,

    /// Preserves fields from newer schema versions on read-modify-write
    /// (`spec.md` §6.3 forward-compat requirement).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}
fn default_temporal_state() -> TemporalState {
    TemporalState::Ongoing
}
fn default_urgency_level() -> UrgencyLevel {
    UrgencyLevel::Unknown
}
fn default_strategy() -> Strategy {
    Strategy::UserChoice
}

impl InvestigationState {
    /// Construct a default state at case-creation time, phase INTAKE
    /// (`spec.md` §4.1 step 2).
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            problem_statement: String::new(),
            temporal_state: TemporalState::Ongoing,
            urgency_level: UrgencyLevel::Unknown,
            strategy: Strategy::UserChoice,
            current_phase: Phase::Intake,
            hypotheses: Vec::new(),
            evidence: Vec::new(),
            turn_history: Vec::new(),
            milestones: Milestones::new(),
            memory: HierarchicalMemory::new(),
            ooda_state: None,
            working_conclusion: None,
            progress_metrics: None,
            degraded_mode: None,
            loopback_count: 0,
            diverse_categories_requested: false,
            extra: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn hypothesis(&self, id: &str) -> Option<&Hypothesis> {
        self.hypotheses.iter().find(|h| h.hypothesis_id == id)
    }

    pub fn hypothesis_mut(&mut self, id: &str) -> Option<&mut Hypothesis> {
        self.hypotheses.iter_mut().find(|h| h.hypothesis_id == id)
    }

    #[must_use]
    pub fn evidence_exists(&self, id: &str) -> bool {
        self.evidence.iter().any(|e| e.evidence_id == id)
    }

    #[must_use]
    pub fn validated_hypothesis(&self) -> Option<&Hypothesis> {
        self.hypotheses
            .iter()
            .find(|h| h.status == HypothesisStatus::Validated)
    }

    #[must_use]
    pub fn active_hypotheses(&self) -> Vec<&Hypothesis> {
        self.hypotheses.iter().filter(|h| h.is_active()).collect()
    }

    #[must_use]
    pub fn next_turn_number(&self) -> u64 {
        self.turn_history.last().map_or(1, |t| t.turn_number + 1)
    }
}

impl Default for InvestigationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_at_intake_with_no_turns() {
        let s = InvestigationState::new();
        assert_eq!(s.current_phase, Phase::Intake);
        assert_eq!(s.next_turn_number(), 1);
        assert!(s.hypotheses.is_empty());
    }

    #[test]
    fn round_trips_through_json_preserving_unknown_fields() {
        let mut s = InvestigationState::new();
        s.extra
            .insert("future_field".to_string(), serde_json::json!("kept"));
        let json = serde_json::to_value(&s).unwrap();
        let back: InvestigationState = serde_json::from_value(json).unwrap();
        assert_eq!(
            back.extra.get("future_field"),
            Some(&serde_json::json!("kept"))
        );
    }
}
