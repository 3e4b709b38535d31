//! The fixed set of milestone predicates tracked across an investigation.
//!
//! `spec.md` §3 describes `milestones` as a `{name -> bool}` map with a fixed
//! key set; §12 of `SPEC_FULL.md` (Open Question 3) folds the two
//! CONSULTING-phase flags into this same map rather than inventing a second
//! state enum.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical milestone keys, in the order they typically complete.
///
/// This list is frozen per `SPEC_FULL.md` §12 (Open Question 2/3) and must
/// not be renamed without a `schema_version` bump (`spec.md` §6.3).
pub const MILESTONE_KEYS: &[&str] = &[
    "problem_statement_confirmed",
    "decided_to_investigate",
    "symptom_verified",
    "scope_confirmed",
    "timeline_reconstructed",
    "root_cause_identified",
    "solution_proposed",
    "solution_verified",
    "verification_complete",
    "documented",
];

/// A flat map of milestone name to completion state.
///
/// Unknown keys (e.g. from a future schema version) are preserved rather
/// than rejected, matching the forward-compat requirement in `spec.md`
/// §6.3.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestones(BTreeMap<String, bool>);

impl Milestones {
    /// A fresh milestone map with every canonical key set to `false`.
    #[must_use]
    pub fn new() -> Self {
        let mut map = BTreeMap::new();
        for key in MILESTONE_KEYS {
            map.insert((*key).to_string(), false);
        }
        Self(map)
    }

    /// Current value of a milestone, `false` if it has never been set.
    #[must_use]
    pub fn is_complete(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// Mark a milestone complete. Returns `true` if this call changed state
    /// (useful for `TurnRecord.milestones_completed_this_turn`).
    pub fn complete(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        let was_incomplete = !self.0.get(&key).copied().unwrap_or(false);
        self.0.insert(key, true);
        was_incomplete
    }

    /// Iterate over all known milestone names and their state.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Names of milestones newly completed compared to a prior snapshot.
    #[must_use]
    pub fn completed_since(&self, previous: &Milestones) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, v)| **v && !previous.is_complete(k))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_milestones_are_all_incomplete() {
        let m = Milestones::new();
        for key in MILESTONE_KEYS {
            assert!(!m.is_complete(key));
        }
    }

    #[test]
    fn complete_reports_transition_once() {
        let mut m = Milestones::new();
        assert!(m.complete("scope_confirmed"));
        assert!(!m.complete("scope_confirmed"));
    }

    #[test]
    fn completed_since_detects_new_completions() {
        let before = Milestones::new();
        let mut after = before.clone();
        after.complete("symptom_verified");
        let diff = after.completed_since(&before);
        assert_eq!(diff, vec!["symptom_verified".to_string()]);
    }
}
