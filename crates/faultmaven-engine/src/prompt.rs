//! Prompt composition (`spec.md` §4.1 step 6).

use faultmaven_contracts::{ChatMessage, ChatRole};
use faultmaven_types::{CaseStatus, Intensity, InvestigationState};

const TOP_K_HYPOTHESES: usize = 5;
const LAST_N_EVIDENCE: usize = 5;

/// Which template was selected, kept for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    ProblemUnderstanding,
    MilestoneBased,
    Terminal,
}

impl PromptKind {
    #[must_use]
    pub fn for_status(status: CaseStatus) -> Self {
        match status {
            CaseStatus::Consulting => PromptKind::ProblemUnderstanding,
            CaseStatus::Investigating => PromptKind::MilestoneBased,
            CaseStatus::Documenting | CaseStatus::Resolved | CaseStatus::Closed => PromptKind::Terminal,
        }
    }
}

/// Build the system prompt for this turn (`spec.md` §4.1 step 6).
#[must_use]
pub fn compose_system_prompt(
    status: CaseStatus,
    state: &InvestigationState,
    intensity: Intensity,
    memory_context: &str,
) -> String {
    match PromptKind::for_status(status) {
        PromptKind::ProblemUnderstanding => problem_understanding_prompt(state),
        PromptKind::MilestoneBased => milestone_based_prompt(state, intensity, memory_context),
        PromptKind::Terminal => terminal_prompt(state),
    }
}

fn problem_understanding_prompt(state: &InvestigationState) -> String {
    let proposed = if state.problem_statement.is_empty() {
        "(no problem statement proposed yet)"
    } else {
        state.problem_statement.as_str()
    };
    format!(
        "You are FaultMaven, helping an operator clarify a problem before investigating it.\n\
         Proposed problem statement: \"{proposed}\"\n\
         Confirm whether this problem statement is accurate, and ask whether the operator wants to \
         formally start an investigation. Do not propose hypotheses yet."
    )
}

fn milestone_based_prompt(state: &InvestigationState, intensity: Intensity, memory_context: &str) -> String {
    let mut top_hypotheses: Vec<_> = state.active_hypotheses();
    top_hypotheses.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    top_hypotheses.truncate(TOP_K_HYPOTHESES);
    let hypotheses_block = if top_hypotheses.is_empty() {
        "(none yet)".to_string()
    } else {
        top_hypotheses
            .iter()
            .map(|h| format!("- [{:?}] {} (confidence={:.2})", h.category, h.statement, h.confidence))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let recent_evidence: Vec<_> = state
        .evidence
        .iter()
        .rev()
        .take(LAST_N_EVIDENCE)
        .map(|e| format!("- [{:?}] {}", e.category, e.content_summary))
        .collect();
    let evidence_block = if recent_evidence.is_empty() {
        "(none yet)".to_string()
    } else {
        recent_evidence.join("\n")
    };

    let milestones_block = state
        .milestones
        .iter()
        .filter(|(_, done)| *done)
        .map(|(name, _)| format!("- {name}"))
        .collect::<Vec<_>>()
        .join("\n");
    let milestones_block = if milestones_block.is_empty() {
        "(none yet)".to_string()
    } else {
        milestones_block
    };

    let diversity_hint = if state.diverse_categories_requested {
        "\nPropose hypotheses from categories not already represented among the active ones above."
    } else {
        ""
    };

    format!(
        "You are FaultMaven, driving a structured troubleshooting investigation.\n\
         Current phase: {:?}. Investigation intensity: {:?}.\n\
         Completed milestones:\n{milestones_block}\n\
         Top active hypotheses:\n{hypotheses_block}\n\
         Recent evidence:\n{evidence_block}\n\
         Memory context:\n{memory_context}{diversity_hint}\n\
         Reply with a structured envelope: reply, milestones_completed[], \
         hypotheses[]{{statement,category,likelihood}}, \
         evidence_links[]{{evidence_id,supports[],refutes[]}}, suggested_phase?",
        state.current_phase, intensity,
    )
}

fn terminal_prompt(state: &InvestigationState) -> String {
    let conclusion = state
        .working_conclusion
        .as_ref()
        .map_or_else(|| "(no working conclusion recorded)".to_string(), |c| c.statement.clone());
    format!(
        "You are FaultMaven, wrapping up a resolved investigation.\n\
         Working conclusion: {conclusion}\n\
         Focus on documentation and retrospective only. Do not propose new hypotheses."
    )
}

/// Wrap the composed system prompt and the raw user message as the
/// message list handed to `LLMProvider::chat`.
#[must_use]
pub fn compose_messages(system_prompt: String, user_message: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: ChatRole::System,
            content: system_prompt,
        },
        ChatMessage {
            role: ChatRole::User,
            content: user_message.to_string(),
        },
    ]
}
