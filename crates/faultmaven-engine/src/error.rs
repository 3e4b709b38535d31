//! The engine's public error surface (`spec.md` §7).

use faultmaven_contracts::{LlmError, RiskLevel, StoreError};

/// Errors the Investigation Engine can surface from `process_turn` and the
/// other entry points in §6.2.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The caller's exclusive lease expired or was lost mid-turn
    /// (`spec.md` §5 "Lease contract"). No mutation was committed.
    #[error("lease lost for case {case_id}")]
    LeaseLost { case_id: String },

    /// Transient LLM failure (timeout, 5xx, rate limit). No mutation was
    /// committed; the caller may retry.
    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    /// Invalid auth or a provider-side configuration defect. No mutation
    /// was committed, but retrying the same call cannot succeed — the
    /// caller must fix the underlying credential/config and is not meant
    /// to retry this turn.
    #[error("LLM call failed fatally and will not succeed on retry: {0}")]
    LlmFatal(String),

    /// The LLM reply could not be parsed at any of the three response
    /// tiers and was not empty-but-benign (`spec.md` §4.1 "Failure
    /// semantics").
    #[error("LLM response could not be parsed: {0}")]
    LlmMalformed(String),

    /// A mutation would have violated a state invariant (`spec.md` §3,
    /// §8). This is a defect, not an expected runtime condition.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An LLM-requested action was not permitted in the current phase and
    /// was dropped (`spec.md` §7).
    #[error("phase guard rejected action in {phase:?}: {action} ({risk})")]
    PhaseGuardFailed {
        phase: faultmaven_types::Phase,
        action: String,
        risk: RiskLevel,
    },

    /// `StateStore::save` failed; the in-memory mutation must be discarded.
    #[error("failed to persist state for case {case_id}: {source}")]
    StatePersistFailed {
        case_id: String,
        #[source]
        source: StoreError,
    },
}

impl From<LlmError> for EngineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Unavailable(msg) => EngineError::LlmUnavailable(msg),
            LlmError::Malformed(msg) => EngineError::LlmMalformed(msg),
            LlmError::Fatal(msg) => EngineError::LlmFatal(msg),
            _ => EngineError::LlmFatal("unrecognized LLM failure".to_string()),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::LeaseLost { case_id } => EngineError::LeaseLost {
                case_id: case_id.clone(),
            },
            StoreError::PersistFailed { case_id, .. } => EngineError::StatePersistFailed {
                case_id: case_id.clone(),
                source: err,
            },
            _ => EngineError::InvariantViolation("unrecognized store failure".to_string()),
        }
    }
}
