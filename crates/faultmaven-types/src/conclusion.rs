//! The engine's current best understanding of the investigation.
//!
//! Mirrors `spec.md` §3 (`WorkingConclusion`). `SPEC_FULL.md` §11 grounds an
//! optional causal breakdown on top of the bare statement, carried by
//! `faultmaven-engine`'s `WorkingConclusionGenerator`, not by this struct
//! directly — this type stays a faithful rendering of the spec shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingConclusion {
    pub statement: String,
    pub confidence: f64,
    pub caveats: Vec<String>,
    pub alternative_hypotheses_ids: Vec<String>,
    pub last_updated_turn: u64,
    pub last_confidence_change_turn: u64,
    pub generated_at_turn: u64,
}

impl WorkingConclusion {
    #[must_use]
    pub fn new(statement: impl Into<String>, confidence: f64, turn: u64) -> Self {
        Self {
            statement: statement.into(),
            confidence: confidence.clamp(0.0, 1.0),
            caveats: Vec::new(),
            alternative_hypotheses_ids: Vec::new(),
            last_updated_turn: turn,
            last_confidence_change_turn: turn,
            generated_at_turn: turn,
        }
    }
}
