//! Candidate root-cause hypotheses and their confidence lifecycle.
//!
//! Mirrors `spec.md` §3 (`Hypothesis`) and §4.2 (confidence model,
//! auto-transitions, lifecycle). Hypotheses live in a flat `Vec` inside
//! `InvestigationState` and reference evidence by opaque id — arena-style,
//! per `spec.md` §9 ("Arena + ids over pointer graphs").

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Broad classification of a hypothesis, used for anchoring detection
/// (`spec.md` §4.2) and category-diverse prompt steering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HypothesisCategory {
    Infrastructure,
    Code,
    Config,
    Data,
    External,
    Human,
    Unknown,
}

/// Lifecycle status of a hypothesis (`spec.md` §4.2).
///
/// CAPTURED is opportunistic (Tier-3 keyword fallback); ACTIVE means it is
/// explicitly under test. Once VALIDATED or REFUTED, status is never
/// downgraded except via explicit `retire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HypothesisStatus {
    Captured,
    Active,
    Validated,
    Refuted,
    Retired,
    Superseded,
}

/// One `(turn, confidence)` sample in a hypothesis's confidence history.
///
/// `spec.md` §3 requires this sequence be monotonic in turn number; §8
/// property 6 requires the last element always equal the current
/// `confidence` after a committed turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePoint {
    pub turn: u64,
    pub confidence: f64,
}

/// A candidate explanation for the reported problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypothesis {
    pub hypothesis_id: String,
    pub statement: String,
    pub category: HypothesisCategory,
    pub status: HypothesisStatus,
    /// Initial prior, fixed at creation time (`spec.md` §4.2: "initial
    /// likelihood" feeds the confidence recompute formula for the life of
    /// the hypothesis).
    pub likelihood: f64,
    /// Current posterior confidence, always in `[0, 1]`.
    pub confidence: f64,
    pub confidence_trajectory: Vec<ConfidencePoint>,
    pub supporting_evidence_ids: BTreeSet<String>,
    pub refuting_evidence_ids: BTreeSet<String>,
    pub created_turn: u64,
    pub last_updated_turn: u64,
    /// OODA iterations since this hypothesis last gained new evidence or a
    /// confidence change `>= decay_per_iter_min_delta` (`spec.md` §4.2).
    pub iterations_without_progress: u32,
}

impl Hypothesis {
    /// Create a new hypothesis. Confidence starts equal to `likelihood`
    /// (`spec.md` §4.2: "On creation: confidence = likelihood").
    #[must_use]
    pub fn new(
        hypothesis_id: impl Into<String>,
        statement: impl Into<String>,
        category: HypothesisCategory,
        likelihood: f64,
        created_turn: u64,
    ) -> Self {
        let likelihood = likelihood.clamp(0.0, 1.0);
        Self {
            hypothesis_id: hypothesis_id.into(),
            statement: statement.into(),
            category,
            status: HypothesisStatus::Captured,
            likelihood,
            confidence: likelihood,
            confidence_trajectory: vec![ConfidencePoint {
                turn: created_turn,
                confidence: likelihood,
            }],
            supporting_evidence_ids: BTreeSet::new(),
            refuting_evidence_ids: BTreeSet::new(),
            created_turn,
            last_updated_turn: created_turn,
            iterations_without_progress: 0,
        }
    }

    /// Record a new confidence value at the given turn, appending to the
    /// trajectory. Callers are responsible for calling this in
    /// non-decreasing turn order (`spec.md` §3 invariant).
    pub fn record_confidence(&mut self, turn: u64, confidence: f64) {
        let confidence = confidence.clamp(0.0, 1.0);
        self.confidence = confidence;
        self.last_updated_turn = turn;
        self.confidence_trajectory
            .push(ConfidencePoint { turn, confidence });
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == HypothesisStatus::Active
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            HypothesisStatus::Validated
                | HypothesisStatus::Refuted
                | HypothesisStatus::Retired
                | HypothesisStatus::Superseded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_hypothesis_seeds_confidence_from_likelihood() {
        let h = Hypothesis::new("h1", "disk full", HypothesisCategory::Infrastructure, 0.6, 1);
        assert_eq!(h.confidence, 0.6);
        assert_eq!(h.confidence_trajectory, vec![ConfidencePoint { turn: 1, confidence: 0.6 }]);
    }

    #[test]
    fn record_confidence_clamps_and_appends() {
        let mut h = Hypothesis::new("h1", "x", HypothesisCategory::Unknown, 0.5, 1);
        h.record_confidence(2, 1.4);
        assert_eq!(h.confidence, 1.0);
        assert_eq!(h.confidence_trajectory.last().unwrap().confidence, 1.0);
    }
}
