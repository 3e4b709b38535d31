//! Hierarchical prompt memory: hot/warm/cold tiers of summarized turns.
//!
//! Mirrors `spec.md` §3 (`HierarchicalMemory`) and §4.4 (tiering rules).
//! The tiering and compression algorithms live in `faultmaven-memory`; this
//! module only holds the data shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryTier {
    Hot,
    Warm,
    Cold,
}

/// A single summarized window of investigation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub snapshot_id: String,
    pub turn_range: (u64, u64),
    pub tier: MemoryTier,
    pub content_summary: String,
    pub key_insights: Vec<String>,
    pub evidence_ids: Vec<String>,
    pub hypothesis_updates: Vec<String>,
    pub confidence_delta: f64,
    pub token_count_estimate: u32,
    pub created_at: DateTime<Utc>,
}

impl MemorySnapshot {
    /// Heuristic token estimate used throughout the Memory Manager:
    /// 4 characters per token (`spec.md` §4.4 "Compression").
    #[must_use]
    pub fn estimate_tokens(text: &str) -> u32 {
        ((text.chars().count() as f64) / 4.0).ceil() as u32
    }

    /// Recompute `token_count_estimate` from the current summary and
    /// insights text.
    pub fn recompute_token_estimate(&mut self) {
        let mut chars = self.content_summary.chars().count();
        for insight in &self.key_insights {
            chars += insight.chars().count();
        }
        self.token_count_estimate = ((chars as f64) / 4.0).ceil() as u32;
    }
}

/// The three-tier memory structure attached to `InvestigationState`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HierarchicalMemory {
    pub hot_memory: Vec<MemorySnapshot>,
    pub warm_memory: Vec<MemorySnapshot>,
    pub cold_memory: Vec<MemorySnapshot>,
}

impl HierarchicalMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total estimated tokens across all three tiers — used to check the
    /// `memory.max_context_tokens` budget is respected by the *organized*
    /// memory, independent of what `get_context_for_prompt` ultimately
    /// selects (`spec.md` §8 property 4 concerns the prompt context
    /// specifically; this is the broader structural total).
    #[must_use]
    pub fn total_token_estimate(&self) -> u32 {
        self.hot_memory
            .iter()
            .chain(self.warm_memory.iter())
            .chain(self.cold_memory.iter())
            .map(|s| s.token_count_estimate)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_tokens_uses_four_chars_per_token() {
        assert_eq!(MemorySnapshot::estimate_tokens("12345678"), 2);
        assert_eq!(MemorySnapshot::estimate_tokens("123"), 1);
        assert_eq!(MemorySnapshot::estimate_tokens(""), 0);
    }
}
