//! Phase guards for LLM-requested actions that aren't permitted right now
//! (`spec.md` §7 `PhaseGuardFailed`: "silently dropped and logged").

use crate::EngineError;
use faultmaven_contracts::RiskLevel;
use faultmaven_types::{CaseStatus, Phase};

/// Check whether a new hypothesis or evidence record may be created right
/// now. Callers treat `Err` as "drop and log", not as a fatal turn error.
pub fn guard_new_finding(status: CaseStatus, phase: Phase, action: &str) -> Result<(), EngineError> {
    if !status.admits_new_findings() {
        return Err(EngineError::PhaseGuardFailed {
            phase,
            action: action.to_string(),
            risk: RiskLevel::High,
        });
    }
    if phase == Phase::Document {
        return Err(EngineError::PhaseGuardFailed {
            phase,
            action: action.to_string(),
            risk: RiskLevel::Medium,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_status_rejects_new_findings_at_high_risk() {
        let err = guard_new_finding(CaseStatus::Resolved, Phase::Validation, "create_hypothesis").unwrap_err();
        match err {
            EngineError::PhaseGuardFailed { risk, .. } => assert_eq!(risk, RiskLevel::High),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn document_phase_rejects_at_medium_risk() {
        let err = guard_new_finding(CaseStatus::Investigating, Phase::Document, "create_hypothesis").unwrap_err();
        match err {
            EngineError::PhaseGuardFailed { risk, .. } => assert_eq!(risk, RiskLevel::Medium),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn investigating_mid_phase_allows_new_findings() {
        assert!(guard_new_finding(CaseStatus::Investigating, Phase::Hypothesis, "create_hypothesis").is_ok());
    }
}
