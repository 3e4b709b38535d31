//! Evidence linked to hypotheses with a support/refute stance.
//!
//! Mirrors `spec.md` §3 (`Evidence`).

use serde::{Deserialize, Serialize};

/// What kind of claim the evidence bears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceCategory {
    SymptomEvidence,
    CausalEvidence,
    ResolutionEvidence,
}

/// Where the evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceSourceType {
    UserProvided,
    SystemQuery,
    Document,
    LlmInferred,
}

/// A single piece of information attached to the investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub evidence_id: String,
    pub category: EvidenceCategory,
    pub source_type: EvidenceSourceType,
    pub content_summary: String,
    #[serde(default)]
    pub attached_file_id: Option<String>,
    pub turn_added: u64,
}

impl Evidence {
    #[must_use]
    pub fn new(
        evidence_id: impl Into<String>,
        category: EvidenceCategory,
        source_type: EvidenceSourceType,
        content_summary: impl Into<String>,
        turn_added: u64,
    ) -> Self {
        Self {
            evidence_id: evidence_id.into(),
            category,
            source_type,
            content_summary: content_summary.into(),
            attached_file_id: None,
            turn_added,
        }
    }

    #[must_use]
    pub fn with_attached_file(mut self, file_id: impl Into<String>) -> Self {
        self.attached_file_id = Some(file_id.into());
        self
    }

    /// Infer the evidence category from investigation progress when the
    /// caller (or Tier-3 fallback) did not supply one (`spec.md` §4.1 step
    /// 9).
    #[must_use]
    pub fn infer_category(verification_complete: bool, solution_proposed: bool) -> EvidenceCategory {
        if !verification_complete {
            EvidenceCategory::SymptomEvidence
        } else if solution_proposed {
            EvidenceCategory::ResolutionEvidence
        } else {
            EvidenceCategory::CausalEvidence
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_symptom_when_verification_incomplete() {
        assert_eq!(
            Evidence::infer_category(false, false),
            EvidenceCategory::SymptomEvidence
        );
    }

    #[test]
    fn infers_resolution_when_solution_proposed() {
        assert_eq!(
            Evidence::infer_category(true, true),
            EvidenceCategory::ResolutionEvidence
        );
    }

    #[test]
    fn infers_causal_otherwise() {
        assert_eq!(
            Evidence::infer_category(true, false),
            EvidenceCategory::CausalEvidence
        );
    }
}
