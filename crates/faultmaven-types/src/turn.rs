//! Per-turn bookkeeping record.
//!
//! Mirrors `spec.md` §3 (`TurnRecord`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// Outcome classification for a committed turn.
///
/// Priority when multiple outcomes could apply, per `spec.md` §4.1 step 17:
/// `Progress > EvidenceCollected > Conversation`. `Stalled` and `Error` are
/// mutually exclusive with the above and set directly by degraded-mode and
/// failure handling respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnOutcomeKind {
    Progress,
    EvidenceCollected,
    Conversation,
    Stalled,
    Error,
}

impl TurnOutcomeKind {
    fn rank(self) -> u8 {
        match self {
            TurnOutcomeKind::Progress => 0,
            TurnOutcomeKind::EvidenceCollected => 1,
            TurnOutcomeKind::Conversation => 2,
            TurnOutcomeKind::Stalled => 3,
            TurnOutcomeKind::Error => 4,
        }
    }

    /// Pick the highest-priority outcome among candidates that apply this
    /// turn, per the ordering in `spec.md` §4.1 step 17. Returns
    /// `Conversation` if no candidates were supplied.
    #[must_use]
    pub fn highest_priority(candidates: &[TurnOutcomeKind]) -> TurnOutcomeKind {
        candidates
            .iter()
            .copied()
            .min_by_key(|k| k.rank())
            .unwrap_or(TurnOutcomeKind::Conversation)
    }
}

/// Record of a single committed turn, appended to `turn_history`.
///
/// `spec.md` §3 invariant: turn numbering is strictly increasing with no
/// gaps (§8 property 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn_number: u64,
    pub role: TurnRole,
    pub outcome: TurnOutcomeKind,
    pub progress_made: bool,
    pub milestones_completed_this_turn: Vec<String>,
    pub hypotheses_created: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_outranks_evidence_and_conversation() {
        let picked = TurnOutcomeKind::highest_priority(&[
            TurnOutcomeKind::Conversation,
            TurnOutcomeKind::EvidenceCollected,
            TurnOutcomeKind::Progress,
        ]);
        assert_eq!(picked, TurnOutcomeKind::Progress);
    }

    #[test]
    fn empty_candidates_default_to_conversation() {
        assert_eq!(
            TurnOutcomeKind::highest_priority(&[]),
            TurnOutcomeKind::Conversation
        );
    }
}
