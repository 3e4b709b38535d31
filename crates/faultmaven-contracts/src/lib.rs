//! External collaborator traits and configuration for the FaultMaven
//! Investigation Engine (`spec.md` §6).
//!
//! The engine crate depends only on these traits, never on a concrete LLM
//! SDK, vector store, or database client — the same seam the teacher draws
//! between its graph nodes and vendor-specific model/embedding/tool
//! implementations.

pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod llm;
pub mod risk;
pub mod store;

pub use checkpoint::{IntegrityError, StateEnvelope};
pub use clock::{Clock, SystemClock};
pub use config::{
    AnchoringConfig, DegradedConfig, EngineConfig, EngineConfigBuilder, HypothesisConfig,
    IntensityTable, LlmConfig, MemoryConfig, OodaConfig, PhaseConfig,
};
pub use llm::{
    ChatMessage, ChatResponse, ChatRole, KnowledgeHit, KnowledgeSearch, LLMProvider, LlmError,
    ProviderMetadata, ResponseFormat, ToolCall, ToolDefinition, Usage,
};
pub use risk::RiskLevel;
pub use store::{StateStore, StoreError};
