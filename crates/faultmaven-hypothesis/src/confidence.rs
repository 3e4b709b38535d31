//! The confidence model (`spec.md` §4.2).

use faultmaven_contracts::HypothesisConfig;
use faultmaven_types::{Hypothesis, HypothesisStatus};

/// Apply stagnation decay to an ACTIVE hypothesis before this turn's
/// evidence-link recompute. No-op for non-ACTIVE hypotheses.
pub fn apply_stagnation_decay(h: &mut Hypothesis, config: &HypothesisConfig, turn: u64) {
    if h.status != HypothesisStatus::Active {
        return;
    }
    let factor = config
        .decay_factor
        .powi(i32::try_from(h.iterations_without_progress).unwrap_or(i32::MAX));
    let decayed = h.confidence * factor;
    h.record_confidence(turn, decayed);
}

/// Recompute confidence from the evidence tally
/// (`confidence = clamp(likelihood + 0.15·supporting − 0.20·refuting, 0, 1)`)
/// and update `iterations_without_progress` based on whether the change
/// cleared `decay_per_iter_min_delta`.
pub fn recompute_after_evidence_link(h: &mut Hypothesis, config: &HypothesisConfig, turn: u64) {
    let supporting = h.supporting_evidence_ids.len() as f64;
    let refuting = h.refuting_evidence_ids.len() as f64;
    let new_confidence = (h.likelihood + 0.15 * supporting - 0.20 * refuting).clamp(0.0, 1.0);
    let delta = (new_confidence - h.confidence).abs();
    if delta >= config.decay_per_iter_min_delta {
        h.iterations_without_progress = 0;
    } else {
        h.iterations_without_progress += 1;
    }
    h.record_confidence(turn, new_confidence);
}

/// Advance the stagnation counter for an ACTIVE hypothesis that received no
/// evidence link this turn (`spec.md` §3: "the count of OODA iterations
/// since the hypothesis last had new evidence or a confidence change ≥
/// 0.05"). No-op for non-ACTIVE hypotheses, mirroring `apply_stagnation_decay`.
pub fn advance_stagnation_counter(h: &mut Hypothesis) {
    if h.status != HypothesisStatus::Active {
        return;
    }
    h.iterations_without_progress += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultmaven_types::HypothesisCategory;

    fn config() -> HypothesisConfig {
        HypothesisConfig::default()
    }

    #[test]
    fn two_supporting_pushes_confidence_to_validate_threshold() {
        let mut h = Hypothesis::new("h1", "disk full", HypothesisCategory::Infrastructure, 0.5, 1);
        h.supporting_evidence_ids.insert("e1".to_string());
        h.supporting_evidence_ids.insert("e2".to_string());
        recompute_after_evidence_link(&mut h, &config(), 2);
        assert!((h.confidence - 0.80).abs() < 1e-9);
    }

    #[test]
    fn two_refuting_drives_confidence_to_zero() {
        let mut h = Hypothesis::new("h1", "disk full", HypothesisCategory::Infrastructure, 0.4, 1);
        h.refuting_evidence_ids.insert("e1".to_string());
        h.refuting_evidence_ids.insert("e2".to_string());
        recompute_after_evidence_link(&mut h, &config(), 2);
        assert!((h.confidence - 0.0).abs() < 1e-9);
    }

    #[test]
    fn small_delta_increments_iterations_without_progress() {
        let mut h = Hypothesis::new("h1", "x", HypothesisCategory::Unknown, 0.5, 1);
        h.status = HypothesisStatus::Active;
        recompute_after_evidence_link(&mut h, &config(), 2);
        assert_eq!(h.iterations_without_progress, 1);
    }

    #[test]
    fn decay_only_applies_to_active_hypotheses() {
        let mut captured = Hypothesis::new("h1", "x", HypothesisCategory::Unknown, 0.8, 1);
        captured.iterations_without_progress = 5;
        apply_stagnation_decay(&mut captured, &config(), 2);
        assert_eq!(captured.confidence, 0.8);
    }

    #[test]
    fn decay_shrinks_active_confidence_geometrically() {
        let mut h = Hypothesis::new("h1", "x", HypothesisCategory::Unknown, 0.8, 1);
        h.status = HypothesisStatus::Active;
        h.iterations_without_progress = 2;
        apply_stagnation_decay(&mut h, &config(), 2);
        assert!((h.confidence - 0.8 * 0.85_f64.powi(2)).abs() < 1e-9);
    }

    #[test]
    fn advance_stagnation_counter_increments_untouched_active_hypothesis() {
        let mut h = Hypothesis::new("h1", "x", HypothesisCategory::Unknown, 0.5, 1);
        h.status = HypothesisStatus::Active;
        advance_stagnation_counter(&mut h);
        advance_stagnation_counter(&mut h);
        assert_eq!(h.iterations_without_progress, 2);
    }

    #[test]
    fn advance_stagnation_counter_ignores_non_active_hypothesis() {
        let mut h = Hypothesis::new("h1", "x", HypothesisCategory::Unknown, 0.5, 1);
        advance_stagnation_counter(&mut h);
        assert_eq!(h.iterations_without_progress, 0);
    }
}
