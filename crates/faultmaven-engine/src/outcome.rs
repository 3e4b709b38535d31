//! `TurnOutcome` — the public result of `process_turn` (`spec.md` §4.1
//! "Contract").

use faultmaven_types::{CaseStatus, Phase, TurnOutcomeKind};

/// Describes what happened during a committed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub outcome: TurnOutcomeKind,
    pub new_hypothesis_ids: Vec<String>,
    pub new_evidence_ids: Vec<String>,
    pub phase_change: Option<(Phase, Phase)>,
    pub status_change: Option<(CaseStatus, CaseStatus)>,
    pub escalation_required: bool,
}
