//! FaultMaven Investigation Engine.
//!
//! This crate is a thin facade over the workspace members: [`faultmaven_types`]
//! for the domain model, [`faultmaven_contracts`] for the collaborator traits
//! and configuration, and [`faultmaven_engine`] for `process_turn` itself.
//! Applications embedding the engine depend on this crate; the member crates
//! exist to keep the Milestone Engine's sub-systems independently testable
//! (`spec.md` §4).

pub use faultmaven_contracts::{
    ChatMessage, ChatResponse, ChatRole, Clock, EngineConfig, KnowledgeHit, KnowledgeSearch,
    LLMProvider, LlmError, ResponseFormat, StateStore, StoreError, SystemClock, ToolCall,
    ToolDefinition,
};
pub use faultmaven_engine::{
    confirm_investigation_transition, process_turn, propose_investigation_transition, EngineDeps,
    EngineError, ProposedTransition, TurnOutcome,
};
pub use faultmaven_types::{
    Case, CaseStatus, Evidence, EvidenceCategory, EvidenceSourceType, Hypothesis,
    HypothesisCategory, HypothesisStatus, InvestigationState, Phase, TurnOutcomeKind,
};
