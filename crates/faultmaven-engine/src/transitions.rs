//! `propose_investigation_transition` / `confirm_investigation_transition`
//! (`spec.md` §6.2).

use crate::parsing::FENCED_JSON;
use crate::EngineError;
use faultmaven_contracts::{ChatMessage, ChatRole, LLMProvider, ResponseFormat};
use faultmaven_types::{Case, CaseStatus, InvestigationState, Strategy, TemporalState, UrgencyLevel};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct ProposalEnvelope {
    temporal_state: TemporalState,
    urgency_level: UrgencyLevel,
    #[serde(default = "default_strategy")]
    strategy: Strategy,
    #[serde(default = "default_confidence")]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

fn default_strategy() -> Strategy {
    Strategy::UserChoice
}

fn default_confidence() -> f64 {
    0.5
}

/// The LLM's inferred parameters for an about-to-be-confirmed
/// investigation transition, for the caller to present to the user.
#[derive(Debug, Clone)]
pub struct ProposedTransition {
    pub temporal_state: TemporalState,
    pub urgency_level: UrgencyLevel,
    pub strategy: Strategy,
    pub confidence: f64,
    pub reasoning: String,
}

/// `propose_investigation_transition` (`spec.md` §6.2): ask the LLM to
/// infer transition parameters from the case's conversation so far.
///
/// # Errors
/// Returns [`EngineError::LlmUnavailable`]/[`EngineError::LlmMalformed`] on
/// LLM failure or an unparseable reply.
pub async fn propose_investigation_transition(
    llm: &dyn LLMProvider,
    case: &Case,
    model: &str,
) -> Result<ProposedTransition, EngineError> {
    let transcript: String = case
        .messages
        .iter()
        .map(|m| format!("{:?}: {}", m.role, m.text))
        .collect::<Vec<_>>()
        .join("\n");

    let messages = vec![
        ChatMessage {
            role: ChatRole::System,
            content: "Infer temporal_state (ONGOING/HISTORICAL), urgency_level \
                      (CRITICAL/HIGH/MEDIUM/LOW/UNKNOWN), and strategy \
                      (MITIGATION_FIRST/ROOT_CAUSE/USER_CHOICE) from this conversation. \
                      Reply with a JSON object with those fields plus confidence and reasoning."
                .to_string(),
        },
        ChatMessage {
            role: ChatRole::User,
            content: transcript,
        },
    ];

    let response = llm
        .chat(&messages, model, 0.2, None, Some(&ResponseFormat { schema: None }))
        .await?;

    let envelope = if let Some(parsed) = &response.parsed {
        serde_json::from_value::<ProposalEnvelope>(parsed.clone())
            .map_err(|e| EngineError::LlmMalformed(e.to_string()))?
    } else if let Some(captures) = FENCED_JSON.captures(&response.content) {
        let block = captures
            .get(1)
            .ok_or_else(|| EngineError::LlmMalformed("no JSON block captured".to_string()))?;
        serde_json::from_str::<ProposalEnvelope>(block.as_str())
            .map_err(|e| EngineError::LlmMalformed(e.to_string()))?
    } else {
        return Err(EngineError::LlmMalformed(
            "transition proposal reply had no structured or embedded JSON".to_string(),
        ));
    };

    Ok(ProposedTransition {
        temporal_state: envelope.temporal_state,
        urgency_level: envelope.urgency_level,
        strategy: envelope.strategy,
        confidence: envelope.confidence.clamp(0.0, 1.0),
        reasoning: envelope.reasoning,
    })
}

/// `confirm_investigation_transition` (`spec.md` §6.2): commit the user's
/// confirmed choices, transition the case to INVESTIGATING, and build the
/// fresh `InvestigationState` (`spec.md` §3 "Lifecycle": state is created on
/// the CONSULTING → INVESTIGATING transition).
#[must_use]
pub fn confirm_investigation_transition(
    case: &Case,
    temporal_state: TemporalState,
    urgency_level: UrgencyLevel,
) -> (Case, InvestigationState) {
    let mut updated_case = case.clone();
    updated_case.status = CaseStatus::Investigating;

    let mut state = InvestigationState::new();
    state.temporal_state = temporal_state;
    state.urgency_level = urgency_level;
    state.problem_statement = case.description.clone();
    state.milestones.complete("problem_statement_confirmed");
    state.milestones.complete("decided_to_investigate");

    (updated_case, state)
}
