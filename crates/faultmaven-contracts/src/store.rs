//! The persistence collaborator (`spec.md` §6.1, §6.3).

use async_trait::async_trait;
use faultmaven_types::InvestigationState;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("lease for case {case_id} was lost before commit")]
    LeaseLost { case_id: String },
    #[error("failed to persist state for case {case_id}: {reason}")]
    PersistFailed { case_id: String, reason: String },
}

/// Loads and saves the opaque `InvestigationState` blob per case
/// (`spec.md` §6.1, §6.3). Implementations must make `save` atomic per case:
/// a failed save must leave the previously committed state untouched.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, case_id: &str) -> Result<Option<InvestigationState>, StoreError>;
    async fn save(&self, case_id: &str, state: &InvestigationState) -> Result<(), StoreError>;
}
