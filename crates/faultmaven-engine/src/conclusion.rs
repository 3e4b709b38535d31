//! `WorkingConclusionGenerator` (`spec.md` §4.1 step 12), enriched with a
//! causal explanation breakdown grounded on the teacher's `causal_analysis`
//! module (`SPEC_FULL.md` §11): instead of a bare statement, the generator
//! also exposes why the top hypothesis outranks the rest as a list of
//! weighted contributing evidence.

use faultmaven_types::{Hypothesis, HypothesisStatus, InvestigationState, WorkingConclusion};

/// Whether a piece of evidence pushed the leading hypothesis's confidence
/// up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Supports,
    Refutes,
}

/// One contributing factor in the causal breakdown.
#[derive(Debug, Clone)]
pub struct CausalFactor {
    pub evidence_id: String,
    pub weight: f64,
    pub stance: Stance,
}

/// Why the leading hypothesis outranks the rest, as weighted evidence
/// contributions (`SPEC_FULL.md` §11).
#[derive(Debug, Clone)]
pub struct CausalBreakdown {
    pub leading_hypothesis_id: String,
    pub factors: Vec<CausalFactor>,
}

/// The generator's output: the spec-shaped conclusion plus the
/// supplemented breakdown.
#[derive(Debug, Clone)]
pub struct GeneratedConclusion {
    pub conclusion: WorkingConclusion,
    pub breakdown: Option<CausalBreakdown>,
}

const SUPPORT_WEIGHT: f64 = 0.15;
const REFUTE_WEIGHT: f64 = 0.20;

/// `ME.generate_working_conclusion` — pick the strongest non-retired
/// hypothesis, render a statement, and build its causal breakdown.
#[must_use]
pub fn generate(
    state: &InvestigationState,
    previous: Option<&WorkingConclusion>,
    turn: u64,
) -> GeneratedConclusion {
    let candidates: Vec<&Hypothesis> = state
        .hypotheses
        .iter()
        .filter(|h| !matches!(h.status, HypothesisStatus::Retired | HypothesisStatus::Refuted))
        .collect();

    let Some(leading) = candidates
        .iter()
        .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap_or(std::cmp::Ordering::Equal))
        .copied()
    else {
        let conclusion = WorkingConclusion::new("No leading hypothesis yet.", 0.0, turn);
        return GeneratedConclusion {
            conclusion,
            breakdown: None,
        };
    };

    let statement = match leading.status {
        HypothesisStatus::Validated => format!("Root cause identified: {}", leading.statement),
        _ => format!("Working theory: {}", leading.statement),
    };

    let alternative_hypotheses_ids: Vec<String> = candidates
        .iter()
        .filter(|h| h.hypothesis_id != leading.hypothesis_id)
        .map(|h| h.hypothesis_id.clone())
        .collect();

    let caveats = if alternative_hypotheses_ids.is_empty() {
        Vec::new()
    } else {
        vec![format!(
            "{} alternative hypothesis(es) not yet ruled out",
            alternative_hypotheses_ids.len()
        )]
    };

    let last_confidence_change_turn = match previous {
        Some(prev) if (prev.confidence - leading.confidence).abs() < f64::EPSILON => prev.last_confidence_change_turn,
        _ => turn,
    };

    let conclusion = WorkingConclusion {
        statement,
        confidence: leading.confidence,
        caveats,
        alternative_hypotheses_ids,
        last_updated_turn: turn,
        last_confidence_change_turn,
        generated_at_turn: turn,
    };

    let mut factors: Vec<CausalFactor> = leading
        .supporting_evidence_ids
        .iter()
        .map(|id| CausalFactor {
            evidence_id: id.clone(),
            weight: SUPPORT_WEIGHT,
            stance: Stance::Supports,
        })
        .chain(leading.refuting_evidence_ids.iter().map(|id| CausalFactor {
            evidence_id: id.clone(),
            weight: REFUTE_WEIGHT,
            stance: Stance::Refutes,
        }))
        .collect();
    factors.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));

    let breakdown = Some(CausalBreakdown {
        leading_hypothesis_id: leading.hypothesis_id.clone(),
        factors,
    });

    GeneratedConclusion { conclusion, breakdown }
}
