//! Hypothesis creation and auto-transitions (`spec.md` §4.2).

use crate::category::infer_category_with_table;
use faultmaven_contracts::{EngineConfig, HypothesisConfig};
use faultmaven_types::{Hypothesis, HypothesisCategory, HypothesisStatus};

/// Where a hypothesis candidate came from, which decides its initial
/// lifecycle status (`spec.md` §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HypothesisSource {
    /// Structured LLM output or an explicit promotion request: starts ACTIVE.
    Structured,
    /// Tier-3 keyword fallback: starts CAPTURED, not yet under test.
    Tier3Fallback,
}

/// `HM.create_or_promote` (`spec.md` §4.1 step 9): build a new hypothesis,
/// inferring category when the caller didn't supply one, honoring
/// `EngineConfig::category_keywords` overrides when `config` is given.
#[must_use]
pub fn create_hypothesis(
    hypothesis_id: impl Into<String>,
    statement: impl Into<String>,
    category: Option<HypothesisCategory>,
    likelihood: f64,
    turn: u64,
    source: HypothesisSource,
    config: Option<&EngineConfig>,
) -> Hypothesis {
    let statement = statement.into();
    let category = category.unwrap_or_else(|| {
        infer_category_with_table(&statement, config.and_then(|c| c.category_keywords.as_ref()))
    });
    let mut h = Hypothesis::new(hypothesis_id, statement, category, likelihood, turn);
    h.status = match source {
        HypothesisSource::Structured => HypothesisStatus::Active,
        HypothesisSource::Tier3Fallback => HypothesisStatus::Captured,
    };
    h
}

/// Link a piece of evidence to a hypothesis by stance (`spec.md` §4.1
/// step 10). Returns `false` if the edge was already present.
pub fn link_evidence(h: &mut Hypothesis, evidence_id: impl Into<String>, supports: bool) -> bool {
    let evidence_id = evidence_id.into();
    if supports {
        h.refuting_evidence_ids.remove(&evidence_id);
        h.supporting_evidence_ids.insert(evidence_id)
    } else {
        h.supporting_evidence_ids.remove(&evidence_id);
        h.refuting_evidence_ids.insert(evidence_id)
    }
}

/// Apply the VALIDATED/REFUTED auto-transition rules and the
/// at-most-one-VALIDATED invariant (`spec.md` §4.2, §8 property 3).
///
/// Never downgrades a hypothesis already VALIDATED or REFUTED except via
/// the demotion-to-SUPERSEDED tie-break below.
pub fn apply_auto_transitions(hypotheses: &mut [Hypothesis], config: &HypothesisConfig) {
    for h in hypotheses.iter_mut() {
        if h.is_terminal() {
            continue;
        }
        if h.confidence >= config.validate_threshold && h.supporting_evidence_ids.len() >= 2 {
            h.status = HypothesisStatus::Validated;
        } else if h.confidence <= config.refute_threshold && h.refuting_evidence_ids.len() >= 2 {
            h.status = HypothesisStatus::Refuted;
        }
    }

    let mut validated: Vec<usize> = hypotheses
        .iter()
        .enumerate()
        .filter(|(_, h)| h.status == HypothesisStatus::Validated)
        .map(|(i, _)| i)
        .collect();

    if validated.len() > 1 {
        // Keep the highest confidence; on a tie keep the newer one
        // (`spec.md` §4.2: "tie break: older" is demoted).
        validated.sort_by(|&a, &b| {
            let ha = &hypotheses[a];
            let hb = &hypotheses[b];
            hb.confidence
                .partial_cmp(&ha.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(hb.created_turn.cmp(&ha.created_turn))
        });
        for &idx in &validated[1..] {
            hypotheses[idx].status = HypothesisStatus::Superseded;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HypothesisConfig {
        HypothesisConfig::default()
    }

    #[test]
    fn validate_threshold_with_two_supporting_promotes_to_validated() {
        let mut h = create_hypothesis(
            "h1",
            "disk full",
            None,
            0.5,
            1,
            HypothesisSource::Structured,
            None,
        );
        h.supporting_evidence_ids.insert("e1".to_string());
        h.supporting_evidence_ids.insert("e2".to_string());
        h.record_confidence(2, 0.80);
        apply_auto_transitions(std::slice::from_mut(&mut h), &config());
        assert_eq!(h.status, HypothesisStatus::Validated);
    }

    #[test]
    fn second_validated_demotes_lower_confidence_to_superseded() {
        let mut a = create_hypothesis("a", "x", None, 0.5, 1, HypothesisSource::Structured, None);
        a.supporting_evidence_ids.insert("e1".to_string());
        a.supporting_evidence_ids.insert("e2".to_string());
        a.record_confidence(2, 0.75);

        let mut b = create_hypothesis("b", "y", None, 0.5, 1, HypothesisSource::Structured, None);
        b.supporting_evidence_ids.insert("e3".to_string());
        b.supporting_evidence_ids.insert("e4".to_string());
        b.record_confidence(2, 0.90);

        let mut all = vec![a, b];
        apply_auto_transitions(&mut all, &config());
        assert_eq!(all[0].status, HypothesisStatus::Superseded);
        assert_eq!(all[1].status, HypothesisStatus::Validated);
    }

    #[test]
    fn refute_threshold_with_two_refuting_demotes_to_refuted() {
        let mut h = create_hypothesis("h1", "x", None, 0.4, 1, HypothesisSource::Structured, None);
        h.refuting_evidence_ids.insert("e1".to_string());
        h.refuting_evidence_ids.insert("e2".to_string());
        h.record_confidence(2, 0.0);
        apply_auto_transitions(std::slice::from_mut(&mut h), &config());
        assert_eq!(h.status, HypothesisStatus::Refuted);
    }

    #[test]
    fn tier3_fallback_creates_captured_status() {
        let h = create_hypothesis(
            "h1",
            "disk is full again",
            None,
            0.5,
            1,
            HypothesisSource::Tier3Fallback,
            None,
        );
        assert_eq!(h.status, HypothesisStatus::Captured);
        assert_eq!(h.category, HypothesisCategory::Infrastructure);
    }
}
