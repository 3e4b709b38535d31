//! Progress metrics and momentum (`spec.md` §4.1 step 12).

use faultmaven_types::{InvestigationMomentum, ProgressMetrics, TurnRecord};

const ACCELERATING_MILESTONE_THRESHOLD: usize = 2;
const ACCELERATING_HYPOTHESIS_THRESHOLD: usize = 3;
const LOOKBACK_TURNS: usize = 3;

/// Everything about this turn that feeds the momentum/progress recompute,
/// gathered before the `TurnRecord` itself is constructed.
#[derive(Debug, Clone, Copy)]
pub struct TurnSignals {
    pub progress_made: bool,
    pub milestones_completed_count: usize,
    pub hypotheses_created_count: usize,
}

/// `ME.recompute_progress` (`spec.md` §4.1 step 12). `turn_history` is the
/// history committed *before* this turn; `signals` describes this turn.
#[must_use]
pub fn recompute(
    turn_history: &[TurnRecord],
    signals: TurnSignals,
    previous: Option<&ProgressMetrics>,
    current_turn: u64,
    evidence_provided_count: u32,
    evidence_pending_count: u32,
    next_critical_steps: Vec<String>,
    is_degraded_mode: bool,
) -> ProgressMetrics {
    let turns_without_progress = if signals.progress_made {
        0
    } else {
        previous.map_or(0, |p| p.turns_without_progress) + 1
    };

    let mut milestones_in_window = signals.milestones_completed_count;
    let mut hypotheses_in_window = signals.hypotheses_created_count;
    for record in turn_history.iter().rev().take(LOOKBACK_TURNS - 1) {
        milestones_in_window += record.milestones_completed_this_turn.len();
        hypotheses_in_window += record.hypotheses_created.len();
    }

    let investigation_momentum = if current_turn <= 2 {
        InvestigationMomentum::Early
    } else if milestones_in_window >= ACCELERATING_MILESTONE_THRESHOLD
        || hypotheses_in_window >= ACCELERATING_HYPOTHESIS_THRESHOLD
    {
        InvestigationMomentum::Accelerating
    } else if turns_without_progress >= 3 {
        InvestigationMomentum::Stalled
    } else {
        InvestigationMomentum::Steady
    };

    ProgressMetrics {
        turns_without_progress,
        investigation_momentum,
        evidence_provided_count,
        evidence_pending_count,
        next_critical_steps,
        is_degraded_mode,
        generated_at_turn: current_turn,
    }
}
