//! End-to-end scenario tests driving `process_turn` against the fakes,
//! one per walkthrough in `spec.md` §8.

use chrono::Utc;
use faultmaven_contracts::EngineConfig;
use faultmaven_engine::fakes::{FakeLlmProvider, FakeStateStore, FixedClock};
use faultmaven_engine::{process_turn, EngineDeps};
use faultmaven_types::{
    Case, CaseStatus, Hypothesis, HypothesisCategory, HypothesisStatus, InvestigationState,
    OODAState, Phase,
};

fn case(status: CaseStatus) -> Case {
    Case {
        id: "c1".to_string(),
        owner_id: "u1".to_string(),
        title: "prod API errors".to_string(),
        description: "Prod API 500s since 14:00.".to_string(),
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        messages: Vec::new(),
    }
}

fn active_hypothesis(id: &str, category: HypothesisCategory, likelihood: f64) -> Hypothesis {
    let mut h = Hypothesis::new(id, format!("theory {id}"), category, likelihood, 1);
    h.status = HypothesisStatus::Active;
    h
}

/// Scenario A — Consulting to investigating (`spec.md` §8).
#[tokio::test]
async fn scenario_a_consulting_to_investigating() {
    let llm = FakeLlmProvider::new(vec![
        FakeLlmProvider::structured(serde_json::json!({
            "reply": "It sounds like prod API 500s since 14:00 — is that accurate?",
            "milestones_completed": [],
            "hypotheses": [],
            "evidence_links": [],
        })),
        FakeLlmProvider::structured(serde_json::json!({
            "reply": "Got it, confirmed.",
            "milestones_completed": ["problem_statement_confirmed"],
            "hypotheses": [],
            "evidence_links": [],
        })),
        FakeLlmProvider::structured(serde_json::json!({
            "reply": "Starting the investigation now.",
            "milestones_completed": ["decided_to_investigate"],
            "hypotheses": [],
            "evidence_links": [],
        })),
        FakeLlmProvider::structured(serde_json::json!({
            "reply": "Let's start with the blast radius.",
            "milestones_completed": [],
            "hypotheses": [],
            "evidence_links": [],
        })),
    ]);
    let store = FakeStateStore::new();
    let clock = FixedClock::new(Utc::now());
    let deps = EngineDeps {
        llm: &llm,
        store: &store,
        clock: &clock,
        knowledge: None,
        model: "test-model",
    };
    let config = EngineConfig::default();
    let consulting_case = case(CaseStatus::Consulting);

    // Turn 1: no hypotheses yet, status stays CONSULTING.
    let (state, outcome) = process_turn(&deps, &config, &consulting_case, "Prod API 500s since 14:00.")
        .await
        .unwrap();
    assert!(state.hypotheses.is_empty());
    assert_eq!(outcome.status_change, None);

    // Turn 2: problem statement confirmed, still not enough to transition.
    let (state, outcome) = process_turn(&deps, &config, &consulting_case, "Yes, that's right.")
        .await
        .unwrap();
    assert!(state.milestones.is_complete("problem_statement_confirmed"));
    assert_eq!(outcome.status_change, None);

    // Turn 3: both confirmations present, ME transitions the status.
    let (state, outcome) = process_turn(&deps, &config, &consulting_case, "Please start investigating.")
        .await
        .unwrap();
    assert!(state.milestones.is_complete("decided_to_investigate"));
    assert_eq!(outcome.status_change, Some((CaseStatus::Consulting, CaseStatus::Investigating)));
    assert_eq!(state.current_phase, Phase::Intake);
    assert_eq!(state.problem_statement, consulting_case.description);

    // The host applies the status change and the next turn is the first
    // one the OODA engine actually sees as INVESTIGATING.
    let investigating_case = case(CaseStatus::Investigating);
    let (state, _outcome) = process_turn(&deps, &config, &investigating_case, "What should we check first?")
        .await
        .unwrap();
    let ooda = state.ooda_state.unwrap();
    assert_eq!(ooda.current_iteration, 1);
}

/// Scenario B — Hypothesis VALIDATED (`spec.md` §8).
#[tokio::test]
async fn scenario_b_hypothesis_validated() {
    let mut seeded = InvestigationState::new();
    seeded.current_phase = Phase::Hypothesis;
    seeded.hypotheses.push(active_hypothesis("h1", HypothesisCategory::Infrastructure, 0.5));
    let store = FakeStateStore::seeded(seeded);

    let llm = FakeLlmProvider::new(vec![FakeLlmProvider::structured(serde_json::json!({
        "reply": "Two independent signals point the same way.",
        "milestones_completed": [],
        "hypotheses": [],
        "evidence_links": [
            {"evidence_id": "e1", "supports": ["h1"], "refutes": []},
            {"evidence_id": "e2", "supports": ["h1"], "refutes": []},
        ],
    }))]);
    let clock = FixedClock::new(Utc::now());
    let deps = EngineDeps {
        llm: &llm,
        store: &store,
        clock: &clock,
        knowledge: None,
        model: "test-model",
    };
    let config = EngineConfig::default();
    let case = case(CaseStatus::Investigating);

    let (state, _outcome) = process_turn(&deps, &config, &case, "disk is full on node-3 and on node-7")
        .await
        .unwrap();
    let h1 = state.hypothesis("h1").unwrap();
    assert!((h1.confidence - 0.80).abs() < 1e-9);
    assert_eq!(h1.status, HypothesisStatus::Validated);
    assert!(state.working_conclusion.unwrap().statement.starts_with("Root cause identified"));
}

/// Scenario C — REFUTED (`spec.md` §8).
#[tokio::test]
async fn scenario_c_hypothesis_refuted() {
    let mut seeded = InvestigationState::new();
    seeded.current_phase = Phase::Hypothesis;
    seeded.hypotheses.push(active_hypothesis("h1", HypothesisCategory::Code, 0.4));
    let store = FakeStateStore::seeded(seeded);

    let llm = FakeLlmProvider::new(vec![FakeLlmProvider::structured(serde_json::json!({
        "reply": "That doesn't hold up.",
        "milestones_completed": [],
        "hypotheses": [],
        "evidence_links": [
            {"evidence_id": "e1", "supports": [], "refutes": ["h1"]},
            {"evidence_id": "e2", "supports": [], "refutes": ["h1"]},
        ],
    }))]);
    let clock = FixedClock::new(Utc::now());
    let deps = EngineDeps {
        llm: &llm,
        store: &store,
        clock: &clock,
        knowledge: None,
        model: "test-model",
    };
    let config = EngineConfig::default();
    let case = case(CaseStatus::Investigating);

    let (state, _outcome) = process_turn(&deps, &config, &case, "the deploy log rules that out").await.unwrap();
    let h1 = state.hypothesis("h1").unwrap();
    assert!((h1.confidence - 0.0).abs() < 1e-9);
    assert_eq!(h1.status, HypothesisStatus::Refuted);
}

/// Scenario D — Loop-back (`spec.md` §8).
#[tokio::test]
async fn scenario_d_loopback_on_all_hypotheses_refuted() {
    let mut seeded = InvestigationState::new();
    seeded.current_phase = Phase::Validation;
    for id in ["h1", "h2", "h3"] {
        seeded.hypotheses.push(active_hypothesis(id, HypothesisCategory::Code, 0.4));
    }
    let store = FakeStateStore::seeded(seeded);

    let llm = FakeLlmProvider::new(vec![FakeLlmProvider::structured(serde_json::json!({
        "reply": "None of these explain the symptom.",
        "milestones_completed": [],
        "hypotheses": [],
        "evidence_links": [
            {"evidence_id": "e1", "supports": [], "refutes": ["h1"]},
            {"evidence_id": "e2", "supports": [], "refutes": ["h1"]},
            {"evidence_id": "e3", "supports": [], "refutes": ["h2"]},
            {"evidence_id": "e4", "supports": [], "refutes": ["h2"]},
            {"evidence_id": "e5", "supports": [], "refutes": ["h3"]},
            {"evidence_id": "e6", "supports": [], "refutes": ["h3"]},
        ],
    }))]);
    let clock = FixedClock::new(Utc::now());
    let deps = EngineDeps {
        llm: &llm,
        store: &store,
        clock: &clock,
        knowledge: None,
        model: "test-model",
    };
    let config = EngineConfig::default();
    let case = case(CaseStatus::Investigating);

    let (state, outcome) = process_turn(&deps, &config, &case, "ruled out all three").await.unwrap();
    assert!(state.hypotheses.iter().all(|h| h.status == HypothesisStatus::Refuted));
    assert_eq!(state.current_phase, Phase::Hypothesis);
    assert_eq!(state.loopback_count, 1);
    assert_eq!(outcome.phase_change, Some((Phase::Validation, Phase::Hypothesis)));
}

/// Scenario E — Anchoring detected (`spec.md` §8).
#[tokio::test]
async fn scenario_e_anchoring_retires_two_lowest_confidence_hypotheses() {
    let mut seeded = InvestigationState::new();
    seeded.current_phase = Phase::Validation;
    let mut ooda = OODAState::new();
    ooda.current_iteration = 5;
    ooda.phase_iterations.insert(Phase::Validation, 5);
    seeded.ooda_state = Some(ooda);
    for (id, likelihood) in [("h1", 0.9), ("h2", 0.7), ("h3", 0.5), ("h4", 0.3), ("h5", 0.1)] {
        seeded
            .hypotheses
            .push(active_hypothesis(id, HypothesisCategory::Infrastructure, likelihood));
    }
    let store = FakeStateStore::seeded(seeded);

    let llm = FakeLlmProvider::new(vec![FakeLlmProvider::structured(serde_json::json!({
        "reply": "Still narrowing it down.",
        "milestones_completed": [],
        "hypotheses": [],
        "evidence_links": [],
    }))]);
    let clock = FixedClock::new(Utc::now());
    let deps = EngineDeps {
        llm: &llm,
        store: &store,
        clock: &clock,
        knowledge: None,
        model: "test-model",
    };
    let config = EngineConfig::default();
    let case = case(CaseStatus::Investigating);

    let (state, _outcome) = process_turn(&deps, &config, &case, "any more logs?").await.unwrap();
    let retired: Vec<String> = state
        .hypotheses
        .iter()
        .filter(|h| h.status == HypothesisStatus::Retired)
        .map(|h| h.hypothesis_id.clone())
        .collect();
    assert_eq!(retired.len(), 2);
    assert!(retired.contains(&"h4".to_string()));
    assert!(retired.contains(&"h5".to_string()));
    assert!(state.diverse_categories_requested);
}

/// Scenario F — Degraded mode (`spec.md` §8).
#[tokio::test]
async fn scenario_f_degraded_mode_after_three_unproductive_turns() {
    let store = FakeStateStore::new();
    let no_progress_reply = || {
        FakeLlmProvider::structured(serde_json::json!({
            "reply": "Still looking into it.",
            "milestones_completed": [],
            "hypotheses": [],
            "evidence_links": [],
        }))
    };
    let llm = FakeLlmProvider::new(vec![no_progress_reply(), no_progress_reply(), no_progress_reply()]);
    let clock = FixedClock::new(Utc::now());
    let deps = EngineDeps {
        llm: &llm,
        store: &store,
        clock: &clock,
        knowledge: None,
        model: "test-model",
    };
    let config = EngineConfig::default();
    let case = case(CaseStatus::Investigating);

    for _ in 0..2 {
        process_turn(&deps, &config, &case, "nothing new").await.unwrap();
    }
    let (state, _outcome) = process_turn(&deps, &config, &case, "nothing new").await.unwrap();

    let metrics = state.progress_metrics.unwrap();
    assert_eq!(metrics.turns_without_progress, 3);
    assert_eq!(metrics.investigation_momentum, faultmaven_types::InvestigationMomentum::Stalled);
    assert!(metrics.is_degraded_mode);
    let degraded = state.degraded_mode.unwrap();
    assert_eq!(degraded.entered_at_turn, 3);
}
