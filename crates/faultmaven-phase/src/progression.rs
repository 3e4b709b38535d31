//! Forward phase progression (`spec.md` §4.5).
//!
//! The milestone table in `spec.md` §4.5 gives this progression by example
//! (`BLAST_RADIUS → TIMELINE when scope_confirmed`, …) rather than as an
//! exhaustive list; the INTAKE→BLAST_RADIUS and TIMELINE→HYPOTHESIS steps
//! follow the same one-milestone-per-transition pattern using the two
//! milestone keys the worked examples leave unassigned
//! (`symptom_verified`, `timeline_reconstructed` — see `SPEC_FULL.md` §12).

use faultmaven_types::{Hypothesis, HypothesisStatus, Milestones, Phase};

/// `PO.next_phase` (`spec.md` §4.5 "Forward progression"): the phase the
/// investigation should move to this turn, or `None` to stay put.
#[must_use]
pub fn next_phase(current: Phase, milestones: &Milestones, hypotheses: &[Hypothesis]) -> Option<Phase> {
    match current {
        Phase::Intake => milestones.is_complete("symptom_verified").then_some(Phase::BlastRadius),
        Phase::BlastRadius => milestones.is_complete("scope_confirmed").then_some(Phase::Timeline),
        Phase::Timeline => milestones
            .is_complete("timeline_reconstructed")
            .then_some(Phase::Hypothesis),
        Phase::Hypothesis => {
            let has_viable_active = hypotheses
                .iter()
                .any(|h| h.status == HypothesisStatus::Active && h.confidence >= 0.5);
            has_viable_active.then_some(Phase::Validation)
        }
        Phase::Validation => {
            let validated_count = hypotheses
                .iter()
                .filter(|h| h.status == HypothesisStatus::Validated)
                .count();
            (validated_count >= 1).then_some(Phase::Solution)
        }
        Phase::Solution => milestones.is_complete("solution_verified").then_some(Phase::Document),
        Phase::Document => None,
    }
}
