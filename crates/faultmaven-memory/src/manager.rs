//! The Memory Manager: tiering, compression and prompt-context assembly
//! (`spec.md` §4.4).

use faultmaven_contracts::MemoryConfig;
use faultmaven_types::{
    Hypothesis, HypothesisStatus, MemorySnapshot, MemoryTier, TurnRecord,
};
use std::collections::BTreeSet;

pub const HOT_WINDOW_TURNS: usize = 3;

/// Stateless hierarchical memory tiering, grounded on the teacher's
/// token-budgeted conversation buffers (`ConversationTokenBufferMemory`)
/// but replacing tiktoken counting with the engine-wide 4-chars/token
/// heuristic and windowed tiers instead of a single flat buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryManager;

impl MemoryManager {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Rebuild hot (last 3 turns) and warm (currently ACTIVE hypotheses)
    /// tiers from source-of-truth data, and dedup cold by evidence id.
    ///
    /// Hot and warm are fully recomputed rather than appended to, which is
    /// what makes repeated calls idempotent (`spec.md` §8 property 8):
    /// `organize` is a pure function of `turn_history` and `hypotheses`.
    pub fn organize(
        &self,
        memory: &mut faultmaven_types::HierarchicalMemory,
        turn_history: &[TurnRecord],
        hypotheses: &[Hypothesis],
    ) {
        memory.hot_memory = turn_history
            .iter()
            .rev()
            .take(HOT_WINDOW_TURNS)
            .map(hot_snapshot_for_turn)
            .collect();
        // Restore chronological order (oldest first) for deterministic output.
        memory.hot_memory.reverse();

        memory.warm_memory = hypotheses
            .iter()
            .filter(|h| h.status == HypothesisStatus::Active)
            .map(warm_snapshot_for_hypothesis)
            .collect();

        dedup_cold_by_evidence_id(&mut memory.cold_memory);
    }

    /// Enforce tier caps (`spec.md` §4.4): hot ≤ 3, warm ≤ 5, cold ≤ 10.
    /// Overflow demotes in order of age; cold overflow beyond the cap is
    /// dropped outright (oldest first).
    pub fn compress(
        &self,
        memory: &mut faultmaven_types::HierarchicalMemory,
        config: &MemoryConfig,
    ) {
        let hot_cap = 3;
        let warm_cap = 5;
        let cold_cap = 10;
        let _ = config; // only compression_every_n_turns is the caller's concern

        sort_oldest_first(&mut memory.hot_memory);
        while memory.hot_memory.len() > hot_cap {
            let mut demoted = memory.hot_memory.remove(0);
            demoted.tier = MemoryTier::Warm;
            memory.warm_memory.push(demoted);
        }

        sort_oldest_first(&mut memory.warm_memory);
        while memory.warm_memory.len() > warm_cap {
            let mut demoted = memory.warm_memory.remove(0);
            demoted.tier = MemoryTier::Cold;
            memory.cold_memory.push(demoted);
        }

        dedup_cold_by_evidence_id(&mut memory.cold_memory);
        sort_oldest_first(&mut memory.cold_memory);
        while memory.cold_memory.len() > cold_cap {
            memory.cold_memory.remove(0);
        }

        for snapshot in memory
            .hot_memory
            .iter_mut()
            .chain(memory.warm_memory.iter_mut())
            .chain(memory.cold_memory.iter_mut())
        {
            snapshot.recompute_token_estimate();
        }
    }

    /// Whether `compress` should run this turn (`spec.md` §4.1 step 14):
    /// every `compression_every_n_turns` turns, exactly.
    #[must_use]
    pub fn should_compress(turn_number: u64, config: &MemoryConfig) -> bool {
        config.compression_every_n_turns > 0
            && turn_number % u64::from(config.compression_every_n_turns) == 0
    }

    /// Greedily assemble a token-budgeted prompt context: hot
    /// (most-recent-first), then warm (highest-confidence-first), then
    /// cold (most-recent-first), stopping before the budget would be
    /// exceeded. Deterministic for a fixed memory state
    /// (`spec.md` §4.4 "Ordering guarantee").
    #[must_use]
    pub fn get_context_for_prompt(
        &self,
        memory: &faultmaven_types::HierarchicalMemory,
        max_tokens: u32,
    ) -> String {
        let mut hot: Vec<&MemorySnapshot> = memory.hot_memory.iter().collect();
        hot.sort_by(|a, b| b.turn_range.1.cmp(&a.turn_range.1));

        let mut warm: Vec<&MemorySnapshot> = memory.warm_memory.iter().collect();
        warm.sort_by(|a, b| {
            b.confidence_delta
                .partial_cmp(&a.confidence_delta)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut cold: Vec<&MemorySnapshot> = memory.cold_memory.iter().collect();
        cold.sort_by(|a, b| b.turn_range.1.cmp(&a.turn_range.1));

        let mut budget_used: u64 = 0;
        let budget = u64::from(max_tokens);

        let mut hot_lines = Vec::new();
        for snap in hot {
            if budget_used + u64::from(snap.token_count_estimate) > budget {
                break;
            }
            budget_used += u64::from(snap.token_count_estimate);
            hot_lines.push(format!("- {}", snap.content_summary));
        }

        let mut warm_lines = Vec::new();
        for snap in warm {
            if budget_used + u64::from(snap.token_count_estimate) > budget {
                break;
            }
            budget_used += u64::from(snap.token_count_estimate);
            warm_lines.push(format!("- {}", snap.content_summary));
        }

        let mut cold_lines = Vec::new();
        for snap in cold {
            if budget_used + u64::from(snap.token_count_estimate) > budget {
                break;
            }
            budget_used += u64::from(snap.token_count_estimate);
            cold_lines.push(format!("- {}", snap.content_summary));
        }

        render_context(&hot_lines, &warm_lines, &cold_lines)
    }
}

fn sort_oldest_first(snapshots: &mut [MemorySnapshot]) {
    snapshots.sort_by(|a, b| a.turn_range.1.cmp(&b.turn_range.1));
}

fn hot_snapshot_for_turn(turn: &TurnRecord) -> MemorySnapshot {
    let mut milestones = turn.milestones_completed_this_turn.join(", ");
    if milestones.is_empty() {
        milestones = "none".to_string();
    }
    let summary = format!(
        "Turn {}: outcome={:?}, milestones=[{}], hypotheses_created={}",
        turn.turn_number,
        turn.outcome,
        milestones,
        turn.hypotheses_created.len()
    );
    let mut snap = MemorySnapshot {
        snapshot_id: format!("hot-turn-{}", turn.turn_number),
        turn_range: (turn.turn_number, turn.turn_number),
        tier: MemoryTier::Hot,
        content_summary: summary,
        key_insights: Vec::new(),
        evidence_ids: Vec::new(),
        hypothesis_updates: turn.hypotheses_created.clone(),
        confidence_delta: 0.0,
        token_count_estimate: 0,
        created_at: turn.timestamp,
    };
    snap.recompute_token_estimate();
    snap
}

fn warm_snapshot_for_hypothesis(h: &Hypothesis) -> MemorySnapshot {
    let summary = format!(
        "Hypothesis {}: \"{}\" (confidence={:.2}, supporting={}, refuting={})",
        h.hypothesis_id,
        h.statement,
        h.confidence,
        h.supporting_evidence_ids.len(),
        h.refuting_evidence_ids.len()
    );
    let evidence_ids: Vec<String> = h
        .supporting_evidence_ids
        .iter()
        .chain(h.refuting_evidence_ids.iter())
        .cloned()
        .collect();
    let created_at = chrono::Utc::now();
    let mut snap = MemorySnapshot {
        snapshot_id: format!("warm-hyp-{}", h.hypothesis_id),
        turn_range: (h.created_turn, h.last_updated_turn),
        tier: MemoryTier::Warm,
        content_summary: summary,
        key_insights: Vec::new(),
        evidence_ids,
        hypothesis_updates: vec![h.hypothesis_id.clone()],
        confidence_delta: h.confidence,
        token_count_estimate: 0,
        created_at,
    };
    snap.recompute_token_estimate();
    snap
}

fn dedup_cold_by_evidence_id(cold: &mut Vec<MemorySnapshot>) {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut deduped = Vec::with_capacity(cold.len());
    for mut snap in std::mem::take(cold) {
        snap.evidence_ids.retain(|id| seen.insert(id.clone()));
        if !snap.evidence_ids.is_empty() || snap.hypothesis_updates.is_empty() {
            deduped.push(snap);
        }
    }
    *cold = deduped;
}

fn render_context(hot: &[String], warm: &[String], cold: &[String]) -> String {
    let mut out = String::new();
    out.push_str("## Recent Activity\n");
    if hot.is_empty() {
        out.push_str("(none)\n");
    } else {
        for line in hot {
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str("## Active Hypothesis Context\n");
    if warm.is_empty() {
        out.push_str("(none)\n");
    } else {
        for line in warm {
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str("## Background Facts\n");
    if cold.is_empty() {
        out.push_str("(none)\n");
    } else {
        for line in cold {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultmaven_types::{HierarchicalMemory, HypothesisCategory, TurnOutcomeKind, TurnRole};

    fn turn(n: u64, outcome: TurnOutcomeKind) -> TurnRecord {
        TurnRecord {
            turn_number: n,
            role: TurnRole::Assistant,
            outcome,
            progress_made: outcome == TurnOutcomeKind::Progress,
            milestones_completed_this_turn: Vec::new(),
            hypotheses_created: Vec::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn organize_keeps_only_last_three_turns_hot() {
        let mgr = MemoryManager::new();
        let mut memory = HierarchicalMemory::new();
        let turns: Vec<TurnRecord> = (1..=5).map(|n| turn(n, TurnOutcomeKind::Conversation)).collect();
        mgr.organize(&mut memory, &turns, &[]);
        assert_eq!(memory.hot_memory.len(), 3);
        assert_eq!(memory.hot_memory[0].turn_range.0, 3);
        assert_eq!(memory.hot_memory[2].turn_range.0, 5);
    }

    #[test]
    fn organize_is_idempotent() {
        let mgr = MemoryManager::new();
        let mut memory = HierarchicalMemory::new();
        let turns: Vec<TurnRecord> = (1..=5).map(|n| turn(n, TurnOutcomeKind::Conversation)).collect();
        let h = Hypothesis::new("h1", "disk full", HypothesisCategory::Infrastructure, 0.6, 1);
        let mut h_active = h.clone();
        h_active.status = HypothesisStatus::Active;
        mgr.organize(&mut memory, &turns, std::slice::from_ref(&h_active));
        let first = memory.clone();
        mgr.organize(&mut memory, &turns, std::slice::from_ref(&h_active));
        assert_eq!(
            first.hot_memory.iter().map(|s| &s.snapshot_id).collect::<Vec<_>>(),
            memory.hot_memory.iter().map(|s| &s.snapshot_id).collect::<Vec<_>>()
        );
        assert_eq!(first.warm_memory.len(), memory.warm_memory.len());
    }

    #[test]
    fn compress_enforces_caps() {
        let mgr = MemoryManager::new();
        let mut memory = HierarchicalMemory::new();
        for n in 1..=10u64 {
            memory.hot_memory.push(hot_snapshot_for_turn(&turn(n, TurnOutcomeKind::Conversation)));
        }
        let config = MemoryConfig::default();
        mgr.compress(&mut memory, &config);
        assert!(memory.hot_memory.len() <= 3);
        assert!(memory.warm_memory.len() <= 5);
        assert!(memory.cold_memory.len() <= 10);
    }

    #[test]
    fn should_compress_triggers_every_n_turns_exactly() {
        let config = MemoryConfig::default();
        assert!(!MemoryManager::should_compress(1, &config));
        assert!(!MemoryManager::should_compress(2, &config));
        assert!(MemoryManager::should_compress(3, &config));
        assert!(!MemoryManager::should_compress(4, &config));
        assert!(MemoryManager::should_compress(6, &config));
    }

    #[test]
    fn context_output_has_stable_section_headings() {
        let mgr = MemoryManager::new();
        let memory = HierarchicalMemory::new();
        let out = mgr.get_context_for_prompt(&memory, 1600);
        assert!(out.starts_with("## Recent Activity\n"));
        assert!(out.contains("## Active Hypothesis Context\n"));
        assert!(out.contains("## Background Facts\n"));
    }

    #[test]
    fn context_is_deterministic_for_fixed_state() {
        let mgr = MemoryManager::new();
        let mut memory = HierarchicalMemory::new();
        let turns: Vec<TurnRecord> = (1..=3).map(|n| turn(n, TurnOutcomeKind::Conversation)).collect();
        mgr.organize(&mut memory, &turns, &[]);
        let a = mgr.get_context_for_prompt(&memory, 1600);
        let b = mgr.get_context_for_prompt(&memory, 1600);
        assert_eq!(a, b);
    }
}
