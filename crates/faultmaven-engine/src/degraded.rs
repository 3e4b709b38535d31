//! Degraded-mode entry/exit (`spec.md` §4.1 step 16).

use faultmaven_contracts::DegradedConfig;
use faultmaven_types::DegradedModeData;

/// `ME.maybe_enter_degraded_mode`. Re-entry is forbidden while already
/// degraded — the caller must exit first (`spec.md` §4.1 step 16).
#[must_use]
pub fn maybe_enter(
    current: &Option<DegradedModeData>,
    turns_without_progress: u32,
    turn: u64,
    config: &DegradedConfig,
) -> Option<DegradedModeData> {
    if current.is_some() || turns_without_progress < config.turns_threshold {
        return None;
    }
    Some(DegradedModeData {
        entered_at_turn: turn,
        reason: format!("no progress for {turns_without_progress} turns"),
        recovery_hints: vec![
            "Provide new evidence for an active hypothesis".to_string(),
            "Confirm or rule out the current scope".to_string(),
            "Ask the assistant to propose alternative hypotheses".to_string(),
        ],
    })
}

/// `ME.maybe_exit_degraded_mode`: exits once a turn records progress.
#[must_use]
pub fn maybe_exit(current: &Option<DegradedModeData>, progress_made_this_turn: bool) -> bool {
    current.is_some() && progress_made_this_turn
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DegradedConfig {
        DegradedConfig::default()
    }

    #[test]
    fn enters_exactly_at_threshold() {
        assert!(maybe_enter(&None, 2, 5, &config()).is_none());
        assert!(maybe_enter(&None, 3, 5, &config()).is_some());
    }

    #[test]
    fn never_re_enters_while_already_degraded() {
        let existing = Some(DegradedModeData {
            entered_at_turn: 3,
            reason: "x".to_string(),
            recovery_hints: Vec::new(),
        });
        assert!(maybe_enter(&existing, 10, 20, &config()).is_none());
    }

    #[test]
    fn exits_only_when_degraded_and_progress_made() {
        assert!(!maybe_exit(&None, true));
        let existing = Some(DegradedModeData {
            entered_at_turn: 3,
            reason: "x".to_string(),
            recovery_hints: Vec::new(),
        });
        assert!(!maybe_exit(&existing, false));
        assert!(maybe_exit(&existing, true));
    }
}
