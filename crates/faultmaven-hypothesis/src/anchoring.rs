//! Anchoring-bias detection and mitigation (`spec.md` §4.2).
//!
//! `AnchoringReport` is a structured account of which trigger(s) fired,
//! grounded on the teacher's `Anomaly` type (`anomaly_detection.rs`) —
//! a tagged deviation record with a human-readable explanation — adapted
//! from a statistical-deviation report into a bias-trigger report
//! (`SPEC_FULL.md` §11).

use faultmaven_contracts::AnchoringConfig;
use faultmaven_types::{Hypothesis, HypothesisCategory, HypothesisStatus};
use std::collections::BTreeMap;

/// One condition that contributed to an anchoring trigger
/// (`spec.md` §4.2 lists three).
#[derive(Debug, Clone, PartialEq)]
pub enum AnchoringTrigger {
    /// `≥ same_category_limit` ACTIVE hypotheses share one category.
    SameCategoryOverload {
        category: HypothesisCategory,
        active_count: u32,
    },
    /// No ACTIVE hypothesis moved confidence by `≥ 0.10` over the last
    /// `stagnation_iterations` recorded points.
    NoSignificantMovement { iterations: u32 },
    /// The top-confidence ACTIVE hypothesis has held its confidence flat
    /// for `stagnation_iterations` recorded points (no new evidence).
    TopHypothesisUnchanged { iterations: u32 },
}

impl AnchoringTrigger {
    #[must_use]
    pub fn explanation(&self) -> String {
        match self {
            AnchoringTrigger::SameCategoryOverload {
                category,
                active_count,
            } => format!(
                "{active_count} ACTIVE hypotheses in category {category:?} — consider alternatives"
            ),
            AnchoringTrigger::NoSignificantMovement { iterations } => format!(
                "no ACTIVE hypothesis gained or lost ≥0.10 confidence over {iterations} iterations"
            ),
            AnchoringTrigger::TopHypothesisUnchanged { iterations } => format!(
                "the leading hypothesis has not changed in {iterations} iterations with no new evidence"
            ),
        }
    }
}

/// Outcome of a full detect+mitigate pass.
#[derive(Debug, Clone)]
pub struct AnchoringReport {
    pub triggers: Vec<AnchoringTrigger>,
    pub retired_hypothesis_ids: Vec<String>,
    /// Consumed by the next prompt composition to ask for hypotheses from
    /// categories not yet represented among ACTIVE (`spec.md` §4.2
    /// "Mitigation").
    pub diverse_categories_requested: bool,
}

/// `HM.detect_anchoring` (`spec.md` §4.2). Returns every trigger that
/// currently applies; empty if none do.
#[must_use]
pub fn detect(hypotheses: &[Hypothesis], config: &AnchoringConfig) -> Vec<AnchoringTrigger> {
    let active: Vec<&Hypothesis> = hypotheses
        .iter()
        .filter(|h| h.status == HypothesisStatus::Active)
        .collect();
    let mut triggers = Vec::new();

    let mut counts: BTreeMap<HypothesisCategory, u32> = BTreeMap::new();
    for h in &active {
        *counts.entry(h.category).or_insert(0) += 1;
    }
    for (category, active_count) in counts {
        if active_count >= config.same_category_limit {
            triggers.push(AnchoringTrigger::SameCategoryOverload {
                category,
                active_count,
            });
        }
    }

    let window = config.stagnation_iterations as usize + 1;
    if !active.is_empty() {
        let any_moved = active.iter().any(|h| trajectory_range(h, window) >= 0.10);
        let has_enough_history = active.iter().any(|h| h.confidence_trajectory.len() >= window);
        if has_enough_history && !any_moved {
            triggers.push(AnchoringTrigger::NoSignificantMovement {
                iterations: config.stagnation_iterations,
            });
        }
    }

    if let Some(top_id) = stable_top_hypothesis_id(&active, window) {
        let top = active.iter().find(|h| h.hypothesis_id == top_id).expect("id came from active");
        if trajectory_range(top, window) < 1e-9 {
            triggers.push(AnchoringTrigger::TopHypothesisUnchanged {
                iterations: config.stagnation_iterations,
            });
        }
    }

    triggers
}

/// The id of the rank-1 (highest confidence) hypothesis at each of the last
/// `window` recorded checkpoints, if it is the *same* hypothesis at every
/// one of them (`spec.md` §4.2: "the top hypothesis has not changed rank
/// for ≥ 3 iterations"). Returns `None` if history is too short or rank-1
/// changed hands anywhere in the window — a hypothesis that merely has a
/// flat confidence trajectory does not qualify unless it has also *held*
/// the top rank throughout.
fn stable_top_hypothesis_id<'a>(active: &[&'a Hypothesis], window: usize) -> Option<&'a str> {
    if active.is_empty() || active.iter().any(|h| h.confidence_trajectory.len() < window) {
        return None;
    }
    let mut rank1_at: Vec<&str> = Vec::with_capacity(window);
    for offset in 0..window {
        let leader = active
            .iter()
            .max_by(|a, b| {
                let idx_a = a.confidence_trajectory.len() - window + offset;
                let idx_b = b.confidence_trajectory.len() - window + offset;
                a.confidence_trajectory[idx_a]
                    .confidence
                    .partial_cmp(&b.confidence_trajectory[idx_b].confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("active is non-empty");
        rank1_at.push(leader.hypothesis_id.as_str());
    }
    let first = rank1_at[0];
    rank1_at.iter().all(|&id| id == first).then_some(first)
}

fn trajectory_range(h: &Hypothesis, window: usize) -> f64 {
    let traj = &h.confidence_trajectory;
    if traj.len() < window {
        return f64::INFINITY;
    }
    let recent = &traj[traj.len() - window..];
    let max = recent.iter().map(|p| p.confidence).fold(f64::MIN, f64::max);
    let min = recent.iter().map(|p| p.confidence).fold(f64::MAX, f64::min);
    max - min
}

/// `HM.force_alternative_generation` (`spec.md` §4.2 "Mitigation"): retire
/// the two ACTIVE hypotheses with the lowest `iterations_without_progress`-
/// adjusted confidence (the same decay curve used in `confidence::apply_stagnation_decay`).
pub fn mitigate(hypotheses: &mut [Hypothesis]) -> Vec<String> {
    fn adjusted_confidence(h: &Hypothesis) -> f64 {
        h.confidence * 0.85_f64.powi(i32::try_from(h.iterations_without_progress).unwrap_or(i32::MAX))
    }

    let mut active_idx: Vec<usize> = hypotheses
        .iter()
        .enumerate()
        .filter(|(_, h)| h.status == HypothesisStatus::Active)
        .map(|(i, _)| i)
        .collect();
    active_idx.sort_by(|&a, &b| {
        adjusted_confidence(&hypotheses[a])
            .partial_cmp(&adjusted_confidence(&hypotheses[b]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut retired_ids = Vec::new();
    for &idx in active_idx.iter().take(2) {
        hypotheses[idx].status = HypothesisStatus::Retired;
        retired_ids.push(hypotheses[idx].hypothesis_id.clone());
    }
    retired_ids
}

/// Run detection, and mitigate if any trigger fired. Returns `None` when
/// nothing triggered.
pub fn detect_and_mitigate(
    hypotheses: &mut [Hypothesis],
    config: &AnchoringConfig,
) -> Option<AnchoringReport> {
    let triggers = detect(hypotheses, config);
    if triggers.is_empty() {
        return None;
    }
    let retired_hypothesis_ids = mitigate(hypotheses);
    Some(AnchoringReport {
        triggers,
        retired_hypothesis_ids,
        diverse_categories_requested: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultmaven_types::Hypothesis;

    fn active_hypothesis(id: &str, category: HypothesisCategory, confidence: f64) -> Hypothesis {
        let mut h = Hypothesis::new(id, id, category, confidence, 1);
        h.status = HypothesisStatus::Active;
        h
    }

    #[test]
    fn five_active_infrastructure_hypotheses_trigger_overload() {
        let hyps: Vec<Hypothesis> = (0..5)
            .map(|i| active_hypothesis(&format!("h{i}"), HypothesisCategory::Infrastructure, 0.5))
            .collect();
        let triggers = detect(&hyps, &AnchoringConfig::default());
        assert!(triggers
            .iter()
            .any(|t| matches!(t, AnchoringTrigger::SameCategoryOverload { active_count, .. } if *active_count == 5)));
    }

    #[test]
    fn mitigate_retires_two_lowest_confidence_active() {
        let mut hyps = vec![
            active_hypothesis("low", HypothesisCategory::Code, 0.2),
            active_hypothesis("mid", HypothesisCategory::Code, 0.5),
            active_hypothesis("lower", HypothesisCategory::Code, 0.1),
            active_hypothesis("high", HypothesisCategory::Code, 0.9),
        ];
        let retired = mitigate(&mut hyps);
        assert_eq!(retired, vec!["lower".to_string(), "low".to_string()]);
        assert_eq!(
            hyps.iter().filter(|h| h.status == HypothesisStatus::Retired).count(),
            2
        );
    }

    #[test]
    fn no_active_hypotheses_never_trigger() {
        let triggers = detect(&[], &AnchoringConfig::default());
        assert!(triggers.is_empty());
    }

    #[test]
    fn rank_change_does_not_trigger_top_hypothesis_unchanged() {
        let window = AnchoringConfig::default().stagnation_iterations as usize + 1;
        // `a` holds rank 1 for the first half of the window, then `b`
        // overtakes and is flat for the rest. Rank-1 identity is not
        // constant across the window, so the trigger must not fire even
        // though `b`'s own trajectory (once on top) is flat.
        let mut a = active_hypothesis("a", HypothesisCategory::Code, 0.9);
        let mut b = active_hypothesis("b", HypothesisCategory::Code, 0.1);
        for turn in 1..window as u64 {
            if turn <= window as u64 / 2 {
                a.record_confidence(turn, 0.9);
                b.record_confidence(turn, 0.1);
            } else {
                a.record_confidence(turn, 0.1);
                b.record_confidence(turn, 0.9);
            }
        }
        assert_eq!(a.confidence_trajectory.len(), window);
        assert_eq!(b.confidence_trajectory.len(), window);
        let triggers = detect(&[a, b], &AnchoringConfig::default());
        assert!(!triggers
            .iter()
            .any(|t| matches!(t, AnchoringTrigger::TopHypothesisUnchanged { .. })));
    }

    #[test]
    fn stable_rank_one_with_flat_confidence_triggers_top_hypothesis_unchanged() {
        let window = AnchoringConfig::default().stagnation_iterations as usize + 1;
        let mut a = active_hypothesis("a", HypothesisCategory::Code, 0.9);
        let mut b = active_hypothesis("b", HypothesisCategory::Code, 0.1);
        for turn in 1..window as u64 {
            a.record_confidence(turn, 0.9);
            b.record_confidence(turn, 0.1);
        }
        assert_eq!(a.confidence_trajectory.len(), window);
        assert_eq!(b.confidence_trajectory.len(), window);
        let triggers = detect(&[a, b], &AnchoringConfig::default());
        assert!(triggers
            .iter()
            .any(|t| matches!(t, AnchoringTrigger::TopHypothesisUnchanged { .. })));
    }
}
