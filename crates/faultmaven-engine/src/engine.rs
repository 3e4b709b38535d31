//! `process_turn` — the Milestone Engine's orchestration loop (`spec.md`
//! §4.1). Everything here is the single public entry point; every other
//! module in this crate is a pure helper it calls in order.

use crate::degraded;
use crate::outcome::TurnOutcome;
use crate::parsing::{self, ParseTier, ParsedTurn};
use crate::phase_guard;
use crate::progress::{self, TurnSignals};
use crate::{conclusion, prompt, EngineError};
use faultmaven_contracts::{
    Clock, EngineConfig, KnowledgeSearch, LLMProvider, ResponseFormat, StateStore,
};
use faultmaven_hypothesis::{
    advance_stagnation_counter, apply_auto_transitions, apply_stagnation_decay, create_hypothesis,
    detect_and_mitigate, link_evidence, recompute_after_evidence_link, HypothesisSource,
};
use faultmaven_phase::{apply_loopback, detect_loopback, next_phase, LoopbackSignals};
use faultmaven_types::{
    Case, CaseStatus, Evidence, EvidenceSourceType, HypothesisStatus, InvestigationState,
    OODAState, Phase, TurnOutcomeKind, TurnRecord, TurnRole,
};
use std::collections::BTreeSet;

/// Everything `process_turn` needs from the outside world
/// (`spec.md` §6.1). Borrowed for the duration of a single turn.
pub struct EngineDeps<'a> {
    pub llm: &'a dyn LLMProvider,
    pub store: &'a dyn StateStore,
    pub clock: &'a dyn Clock,
    /// Optional in-prompt retrieval; a miss or error degrades silently
    /// (`spec.md` §6.1).
    pub knowledge: Option<&'a dyn KnowledgeSearch>,
    pub model: &'a str,
}

/// `ME.process_turn` (`spec.md` §4.1). The caller must hold the per-case
/// lease for the duration of this call (`spec.md` §5) — the engine itself
/// takes no lock.
///
/// # Errors
/// Returns [`EngineError::LlmUnavailable`] on a transient LLM failure (no
/// mutation committed, caller may retry), [`EngineError::LlmFatal`] on a
/// non-retryable auth/config failure, and [`EngineError::LeaseLost`] /
/// [`EngineError::StatePersistFailed`] on store failures. A malformed LLM
/// reply does *not* surface as an `Err` — per `spec.md` §7 it is recorded as
/// an `ERROR`-outcome turn so the case stays usable.
pub async fn process_turn(
    deps: &EngineDeps<'_>,
    config: &EngineConfig,
    case: &Case,
    user_message: &str,
) -> Result<(InvestigationState, TurnOutcome), EngineError> {
    let mut state = deps.store.load(&case.id).await?.unwrap_or_default();
    let previous_progress = state.progress_metrics.clone();
    let previous_conclusion = state.working_conclusion.clone();

    let memory_manager = faultmaven_memory::MemoryManager::new();
    memory_manager.organize(&mut state.memory, &state.turn_history, &state.hypotheses);

    let phase_before = state.current_phase;
    let intensity = if case.status == CaseStatus::Investigating {
        let ooda = state.ooda_state.get_or_insert_with(OODAState::new);
        let phase_iteration = ooda.bump(phase_before);
        faultmaven_ooda::intensity_for(phase_before, phase_iteration, &config.ooda)
    } else {
        faultmaven_types::Intensity::None
    };

    let mut memory_context =
        memory_manager.get_context_for_prompt(&state.memory, config.memory.max_context_tokens);
    if let Some(search) = deps.knowledge {
        if case.status == CaseStatus::Investigating && !state.problem_statement.is_empty() {
            if let Ok(hits) = search.search(&state.problem_statement, 3).await {
                if !hits.is_empty() {
                    memory_context.push_str("\n## Knowledge Hints\n");
                    for hit in hits {
                        memory_context.push_str(&format!("- {} (score={:.2})\n", hit.text, hit.score));
                    }
                }
            }
        }
    }

    let system_prompt = prompt::compose_system_prompt(case.status, &state, intensity, &memory_context);
    let messages = prompt::compose_messages(system_prompt, user_message);

    let temperature = if phase_before == Phase::Validation {
        config.llm.validation_temperature
    } else {
        config.llm.default_temperature
    };

    let response = deps
        .llm
        .chat(&messages, deps.model, temperature, None, Some(&ResponseFormat { schema: None }))
        .await?;

    let turn_number = state.next_turn_number();

    match parsing::parse_response(&response) {
        Ok(parsed) => {
            commit_parsed_turn(
                deps,
                config,
                &memory_manager,
                case,
                state,
                parsed,
                turn_number,
                intensity,
                previous_progress.as_ref(),
                previous_conclusion.as_ref(),
            )
            .await
        }
        Err(EngineError::LlmMalformed(reason)) => {
            commit_malformed_turn(deps, config, case, state, turn_number, &reason, previous_progress.as_ref()).await
        }
        Err(other) => Err(other),
    }
}

async fn commit_malformed_turn(
    deps: &EngineDeps<'_>,
    config: &EngineConfig,
    case: &Case,
    mut state: InvestigationState,
    turn_number: u64,
    reason: &str,
    previous_progress: Option<&faultmaven_types::ProgressMetrics>,
) -> Result<(InvestigationState, TurnOutcome), EngineError> {
    tracing::warn!(case_id = %case.id, %reason, "LLM reply could not be parsed; recording an ERROR turn");

    let signals = TurnSignals {
        progress_made: false,
        milestones_completed_count: 0,
        hypotheses_created_count: 0,
    };
    let (provided, pending) = evidence_counts(&state);
    let progress_metrics = progress::recompute(
        &state.turn_history,
        signals,
        previous_progress,
        turn_number,
        provided,
        pending,
        next_critical_steps(&state),
        state.degraded_mode.is_some(),
    );

    if let Some(entered) =
        degraded::maybe_enter(&state.degraded_mode, progress_metrics.turns_without_progress, turn_number, &config.degraded)
    {
        state.degraded_mode = Some(entered);
    }
    state.progress_metrics = Some(progress_metrics);

    state.turn_history.push(TurnRecord {
        turn_number,
        role: TurnRole::Assistant,
        outcome: TurnOutcomeKind::Error,
        progress_made: false,
        milestones_completed_this_turn: Vec::new(),
        hypotheses_created: Vec::new(),
        timestamp: deps.clock.now(),
    });

    deps.store.save(&case.id, &state).await?;

    let outcome = TurnOutcome {
        reply: "I couldn't make sense of that last reply — could you rephrase, or share more detail?"
            .to_string(),
        outcome: TurnOutcomeKind::Error,
        new_hypothesis_ids: Vec::new(),
        new_evidence_ids: Vec::new(),
        phase_change: None,
        status_change: None,
        escalation_required: false,
    };
    Ok((state, outcome))
}

#[allow(clippy::too_many_arguments)]
async fn commit_parsed_turn(
    deps: &EngineDeps<'_>,
    config: &EngineConfig,
    memory_manager: &faultmaven_memory::MemoryManager,
    case: &Case,
    mut state: InvestigationState,
    parsed: ParsedTurn,
    turn_number: u64,
    intensity: faultmaven_types::Intensity,
    previous_progress: Option<&faultmaven_types::ProgressMetrics>,
    previous_conclusion: Option<&faultmaven_types::WorkingConclusion>,
) -> Result<(InvestigationState, TurnOutcome), EngineError> {
    let phase_before = state.current_phase;
    let status_before = case.status;
    let milestones_before = state.milestones.clone();

    let hypothesis_source = match parsed.tier {
        ParseTier::KeywordFallback => HypothesisSource::Tier3Fallback,
        ParseTier::Structured | ParseTier::EmbeddedJson => HypothesisSource::Structured,
    };

    // Step 9: hypothesis ingestion.
    let mut new_hypothesis_ids = Vec::new();
    for proposal in &parsed.hypotheses {
        if let Err(err) = phase_guard::guard_new_finding(status_before, phase_before, "create_hypothesis") {
            tracing::warn!(case_id = %case.id, error = %err, "dropped hypothesis proposal");
            continue;
        }
        let id = format!("h-{turn_number}-{}", state.hypotheses.len());
        let hypothesis = create_hypothesis(
            id.clone(),
            proposal.statement.clone(),
            proposal.category,
            proposal.likelihood,
            turn_number,
            hypothesis_source,
            Some(config),
        );
        state.hypotheses.push(hypothesis);
        new_hypothesis_ids.push(id);
    }

    // Step 9/10: evidence creation (when referenced but unseen) and linking.
    let mut new_evidence_ids = Vec::new();
    let mut touched_hypothesis_ids: BTreeSet<String> = BTreeSet::new();
    for link in &parsed.evidence_links {
        if !state.evidence_exists(&link.evidence_id) {
            match phase_guard::guard_new_finding(status_before, phase_before, "create_evidence") {
                Ok(()) => {
                    let category = Evidence::infer_category(
                        state.milestones.is_complete("verification_complete"),
                        state.milestones.is_complete("solution_proposed"),
                    );
                    state.evidence.push(Evidence::new(
                        link.evidence_id.clone(),
                        category,
                        EvidenceSourceType::LlmInferred,
                        format!("evidence \"{}\" reported in turn {turn_number}", link.evidence_id),
                        turn_number,
                    ));
                    new_evidence_ids.push(link.evidence_id.clone());
                }
                Err(err) => {
                    tracing::warn!(case_id = %case.id, error = %err, "dropped evidence proposal");
                    continue;
                }
            }
        }

        for target in &link.supports {
            if let Some(h) = state.hypothesis_mut(target) {
                if link_evidence(h, link.evidence_id.clone(), true) {
                    touched_hypothesis_ids.insert(target.clone());
                }
            }
        }
        for target in &link.refutes {
            if let Some(h) = state.hypothesis_mut(target) {
                if link_evidence(h, link.evidence_id.clone(), false) {
                    touched_hypothesis_ids.insert(target.clone());
                }
            }
        }
    }

    for h in state.hypotheses.iter_mut().filter(|h| h.status == HypothesisStatus::Active) {
        apply_stagnation_decay(h, &config.hypothesis, turn_number);
    }
    for id in &touched_hypothesis_ids {
        if let Some(h) = state.hypothesis_mut(id) {
            recompute_after_evidence_link(h, &config.hypothesis, turn_number);
        }
    }
    for h in state.hypotheses.iter_mut() {
        if !touched_hypothesis_ids.contains(&h.hypothesis_id) {
            advance_stagnation_counter(h);
        }
    }
    apply_auto_transitions(&mut state.hypotheses, &config.hypothesis);

    // Step 9: milestones.
    for milestone in &parsed.milestones_completed {
        state.milestones.complete(milestone.clone());
    }
    let milestones_completed_this_turn = state.milestones.completed_since(&milestones_before);

    // Step 11: anchoring check, full intensity only.
    if intensity == faultmaven_types::Intensity::Full {
        if let Some(report) = detect_and_mitigate(&mut state.hypotheses, &config.anchoring) {
            for trigger in &report.triggers {
                tracing::info!(case_id = %case.id, trigger = %trigger.explanation(), "anchoring bias detected");
            }
            state.diverse_categories_requested = report.diverse_categories_requested;
        }
        if let Some(ooda) = &mut state.ooda_state {
            ooda.last_anchoring_check_iteration = ooda.current_iteration;
        }
    }

    // Step 12: working conclusion + progress metrics.
    let generated = conclusion::generate(&state, previous_conclusion, turn_number);
    if let Some(breakdown) = &generated.breakdown {
        tracing::debug!(
            case_id = %case.id,
            hypothesis_id = %breakdown.leading_hypothesis_id,
            factor_count = breakdown.factors.len(),
            "working conclusion causal breakdown"
        );
    }
    state.working_conclusion = Some(generated.conclusion);

    let progress_made = !milestones_completed_this_turn.is_empty()
        || !new_hypothesis_ids.is_empty()
        || !new_evidence_ids.is_empty();
    let (evidence_provided_count, evidence_pending_count) = evidence_counts(&state);
    let signals = TurnSignals {
        progress_made,
        milestones_completed_count: milestones_completed_this_turn.len(),
        hypotheses_created_count: new_hypothesis_ids.len(),
    };
    let mut progress_metrics = progress::recompute(
        &state.turn_history,
        signals,
        previous_progress,
        turn_number,
        evidence_provided_count,
        evidence_pending_count,
        next_critical_steps(&state),
        state.degraded_mode.is_some(),
    );

    // Step 13: loop-back, else forward progression.
    let loopback_signals = LoopbackSignals {
        scope_change_signaled: phase_before == Phase::Timeline
            && parsed.suggested_phase == Some(Phase::BlastRadius),
        contradictory_temporal_evidence: false,
    };
    let decision = detect_loopback(state.current_phase, &state.hypotheses, loopback_signals);
    let (phase_after, escalation_required) =
        apply_loopback(&decision, state.current_phase, &mut state.loopback_count, &config.phase);
    state.current_phase = phase_after;
    if escalation_required {
        progress_metrics.investigation_momentum = faultmaven_types::InvestigationMomentum::Stalled;
    } else if !decision.needs_loopback {
        if let Some(advanced) = next_phase(state.current_phase, &state.milestones, &state.hypotheses) {
            state.current_phase = advanced;
        }
    }

    // Step 14: memory compress every N turns.
    if faultmaven_memory::MemoryManager::should_compress(turn_number, &config.memory) {
        memory_manager.compress(&mut state.memory, &config.memory);
    }

    // Step 15: status transitions (the caller applies `status_change` to its `Case`).
    let mut status_after = status_before;
    if status_before == CaseStatus::Consulting
        && state.milestones.is_complete("problem_statement_confirmed")
        && state.milestones.is_complete("decided_to_investigate")
    {
        status_after = CaseStatus::Investigating;
        if state.problem_statement.is_empty() {
            state.problem_statement = case.description.clone();
        }
    } else if status_before == CaseStatus::Investigating && state.milestones.is_complete("solution_verified") {
        status_after = CaseStatus::Resolved;
    } else if status_before == CaseStatus::Resolved && parsed.suggested_phase == Some(Phase::Document) {
        status_after = CaseStatus::Documenting;
    } else if status_before == CaseStatus::Documenting && state.milestones.is_complete("documented") {
        status_after = CaseStatus::Closed;
    }
    let status_change = (status_after != status_before).then_some((status_before, status_after));

    // Step 16: degraded mode entry/exit.
    if let Some(entered) =
        degraded::maybe_enter(&state.degraded_mode, progress_metrics.turns_without_progress, turn_number, &config.degraded)
    {
        state.degraded_mode = Some(entered);
    } else if degraded::maybe_exit(&state.degraded_mode, progress_made) {
        state.degraded_mode = None;
    }
    progress_metrics.is_degraded_mode = state.degraded_mode.is_some();
    state.progress_metrics = Some(progress_metrics);

    // Step 17: outcome priority and commit.
    let mut candidates = vec![TurnOutcomeKind::Conversation];
    if !new_evidence_ids.is_empty() {
        candidates.push(TurnOutcomeKind::EvidenceCollected);
    }
    if progress_made {
        candidates.push(TurnOutcomeKind::Progress);
    }
    let outcome_kind = TurnOutcomeKind::highest_priority(&candidates);

    state.turn_history.push(TurnRecord {
        turn_number,
        role: TurnRole::Assistant,
        outcome: outcome_kind,
        progress_made,
        milestones_completed_this_turn,
        hypotheses_created: new_hypothesis_ids.clone(),
        timestamp: deps.clock.now(),
    });

    deps.store.save(&case.id, &state).await?;

    let phase_change = (state.current_phase != phase_before).then_some((phase_before, state.current_phase));
    let outcome = TurnOutcome {
        reply: parsed.reply,
        outcome: outcome_kind,
        new_hypothesis_ids,
        new_evidence_ids,
        phase_change,
        status_change,
        escalation_required,
    };
    Ok((state, outcome))
}

fn evidence_counts(state: &InvestigationState) -> (u32, u32) {
    let provided = u32::try_from(state.evidence.len()).unwrap_or(u32::MAX);
    let pending = u32::try_from(
        state
            .active_hypotheses()
            .iter()
            .filter(|h| h.supporting_evidence_ids.is_empty() && h.refuting_evidence_ids.is_empty())
            .count(),
    )
    .unwrap_or(u32::MAX);
    (provided, pending)
}

fn next_critical_steps(state: &InvestigationState) -> Vec<String> {
    state
        .active_hypotheses()
        .iter()
        .filter(|h| h.supporting_evidence_ids.is_empty() && h.refuting_evidence_ids.is_empty())
        .map(|h| format!("Gather evidence for hypothesis \"{}\"", h.statement))
        .collect()
}
