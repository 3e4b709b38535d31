//! Loop-back detection (`spec.md` §4.5).

use faultmaven_contracts::PhaseConfig;
use faultmaven_types::{Hypothesis, HypothesisStatus, Phase};

/// Which §4.5 trigger fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum LoopbackOutcome {
    HypothesisRefuted,
    InsufficientCandidates,
    ScopeChanged,
    ContradictoryTemporalEvidence,
}

/// External events the engine observed this turn that only it can know
/// about (an assistant-signaled scope change, new contradictory temporal
/// evidence). Everything else `detect` can derive from `hypotheses` alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackSignals {
    pub scope_change_signaled: bool,
    pub contradictory_temporal_evidence: bool,
}

/// A loop-back decision (`spec.md` §4.5 "returns `(needs_loopback, outcome,
/// reason)`"). `needs_loopback = false` when nothing triggered.
#[derive(Debug, Clone)]
pub struct LoopbackDecision {
    pub needs_loopback: bool,
    pub target_phase: Phase,
    pub outcome: Option<LoopbackOutcome>,
    pub reason: String,
}

impl LoopbackDecision {
    fn none() -> Self {
        Self {
            needs_loopback: false,
            target_phase: Phase::Intake,
            outcome: None,
            reason: String::new(),
        }
    }
}

/// Phases where a forward-progressing investigation needs live hypothesis
/// candidates to keep going.
fn phase_requires_candidates(phase: Phase) -> bool {
    matches!(phase, Phase::Hypothesis | Phase::Validation | Phase::Solution)
}

/// `PO.detect_loopback` (`spec.md` §4.5 "Loop-back detection"). Checked in
/// the order the trigger list is given; the first applicable trigger wins.
#[must_use]
pub fn detect(current_phase: Phase, hypotheses: &[Hypothesis], signals: LoopbackSignals) -> LoopbackDecision {
    if current_phase == Phase::Validation {
        let active: Vec<&Hypothesis> = hypotheses
            .iter()
            .filter(|h| h.status == HypothesisStatus::Active || h.status == HypothesisStatus::Refuted)
            .collect();
        let has_active = active.iter().any(|h| h.status == HypothesisStatus::Active);
        let all_refuted = !active.is_empty() && active.iter().all(|h| h.status == HypothesisStatus::Refuted);
        if all_refuted && !has_active {
            return LoopbackDecision {
                needs_loopback: true,
                target_phase: Phase::Hypothesis,
                outcome: Some(LoopbackOutcome::HypothesisRefuted),
                reason: "all active hypotheses were refuted this turn".to_string(),
            };
        }
    }

    if phase_requires_candidates(current_phase) {
        let viable = hypotheses
            .iter()
            .filter(|h| h.status != HypothesisStatus::Refuted)
            .count();
        if viable < 2 {
            return LoopbackDecision {
                needs_loopback: true,
                target_phase: Phase::Hypothesis,
                outcome: Some(LoopbackOutcome::InsufficientCandidates),
                reason: format!("only {viable} non-refuted hypothesis candidate(s) remain"),
            };
        }
    }

    if current_phase == Phase::Timeline && signals.scope_change_signaled {
        return LoopbackDecision {
            needs_loopback: true,
            target_phase: Phase::BlastRadius,
            outcome: Some(LoopbackOutcome::ScopeChanged),
            reason: "assistant signaled a scope change".to_string(),
        };
    }

    if current_phase == Phase::Validation && signals.contradictory_temporal_evidence {
        return LoopbackDecision {
            needs_loopback: true,
            target_phase: Phase::Timeline,
            outcome: Some(LoopbackOutcome::ContradictoryTemporalEvidence),
            reason: "contradictory temporal evidence arrived".to_string(),
        };
    }

    LoopbackDecision::none()
}

/// Apply a loop-back decision against the `loopback_count` cap
/// (`spec.md` §4.5: "when `loopback_count = 3`, further loop-backs are
/// suppressed"). Returns the phase to commit (the decision's target, or the
/// unchanged current phase) and whether escalation should be surfaced.
pub fn apply(
    decision: &LoopbackDecision,
    current_phase: Phase,
    loopback_count: &mut u32,
    config: &PhaseConfig,
) -> (Phase, bool) {
    if !decision.needs_loopback {
        return (current_phase, false);
    }
    if *loopback_count >= config.loopback_max {
        return (current_phase, true);
    }
    *loopback_count += 1;
    (decision.target_phase, false)
}
