//! Risk tagging for silently-dropped LLM-requested actions
//! (`SPEC_FULL.md` §11, grounded on the teacher's `approval::RiskLevel`).
//!
//! `spec.md` §7's `PhaseGuardFailed` says only that a disallowed action
//! "is silently dropped and logged" — this adds a severity tag to that log
//! line so operators can tell a denied hypothesis-creation-in-DOCUMENTING
//! apart from, say, a denied status transition, without inventing a new
//! error kind.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RiskLevel {
    /// A guard rejected a cosmetic or redundant action.
    Low,
    /// A guard rejected an action that would have altered investigation
    /// state in a phase that doesn't expect it.
    #[default]
    Medium,
    /// A guard rejected an action that would have violated a status
    /// transition rule (`spec.md` §8 property 7).
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}
