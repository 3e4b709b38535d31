//! Investigation phases and adaptive intensity.
//!
//! Mirrors `spec.md` §3 (`current_phase`), §4.3 (`OODAState`, intensity) and
//! §4.5 (phase progression).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stage of the investigation. Advances by milestone completion; may loop
/// back under the conditions in `spec.md` §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Intake,
    BlastRadius,
    Timeline,
    Hypothesis,
    Validation,
    Solution,
    Document,
}

impl Phase {
    /// Stable ordering used for "has this phase advanced" comparisons. Not
    /// meant to imply loop-backs can't happen — only that forward
    /// progression is this sequence.
    #[must_use]
    pub fn ordinal(self) -> u8 {
        match self {
            Phase::Intake => 0,
            Phase::BlastRadius => 1,
            Phase::Timeline => 2,
            Phase::Hypothesis => 3,
            Phase::Validation => 4,
            Phase::Solution => 5,
            Phase::Document => 6,
        }
    }
}

/// Adaptive investigation intensity, selected per `spec.md` §4.3's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    None,
    Light,
    Medium,
    Full,
}

/// OODA loop bookkeeping (`spec.md` §3 `OODAState`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OODAState {
    /// Monotonic; increments once per INVESTIGATING turn regardless of
    /// phase (`spec.md` §4.3).
    pub current_iteration: u64,
    pub last_anchoring_check_iteration: u64,
    /// Iteration count observed so far within each phase, used to select
    /// the row of the intensity table.
    pub phase_iterations: BTreeMap<Phase, u64>,
}

impl OODAState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `current_iteration` and the per-phase counter for `phase`,
    /// returning the new per-phase iteration count.
    pub fn bump(&mut self, phase: Phase) -> u64 {
        self.current_iteration += 1;
        let counter = self.phase_iterations.entry(phase).or_insert(0);
        *counter += 1;
        *counter
    }

    #[must_use]
    pub fn iterations_in(&self, phase: Phase) -> u64 {
        self.phase_iterations.get(&phase).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_increments_both_counters() {
        let mut s = OODAState::new();
        assert_eq!(s.bump(Phase::Intake), 1);
        assert_eq!(s.current_iteration, 1);
        assert_eq!(s.bump(Phase::Intake), 2);
        assert_eq!(s.current_iteration, 2);
        assert_eq!(s.bump(Phase::Hypothesis), 1);
        assert_eq!(s.current_iteration, 3);
        assert_eq!(s.iterations_in(Phase::Intake), 2);
    }
}
