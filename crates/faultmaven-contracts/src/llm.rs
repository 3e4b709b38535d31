//! The LLM collaborator the engine is built against.
//!
//! Mirrors `spec.md` §6.1. The engine never talks to a vendor SDK directly —
//! it calls [`LLMProvider::chat`] and recognizes a small, closed set of
//! failure modes via [`LlmError`], the same way the teacher's `ChatModel`
//! trait is the seam between graph nodes and vendor clients.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A chat message in the conversation sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// JSON-schema-carrying tool definition offered to the model for function
/// calling (`spec.md` §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters_schema: serde_json::Value,
}

/// Requests the model return a JSON object, optionally validated against a
/// schema. Providers that cannot honor this must reject the request
/// (`spec.md` §6.1) so the engine can fall back to embedded-JSON parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat {
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// The model's reply. `parsed` is populated when `response_format` was
/// honored; `tool_calls` when the model invoked one of the offered tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    #[serde(default)]
    pub parsed: Option<serde_json::Value>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub usage: Usage,
}

/// Failure modes the engine recognizes from an LLM call (`spec.md` §6.1,
/// §7). Anything else a provider implementation wants to surface should be
/// wrapped as `Malformed` or `Unavailable` at the call site — the engine
/// only branches on this enum.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LlmError {
    /// Timeout, 5xx, or rate limit — the caller may retry.
    #[error("LLM call timed out or was rate limited: {0}")]
    Unavailable(String),
    /// Invalid auth or a provider-side configuration defect — not
    /// retryable by the engine.
    #[error("LLM call failed with a fatal auth/config error: {0}")]
    Fatal(String),
    /// The response could not be parsed into a usable `ChatResponse` at
    /// all (e.g. transport-level corruption). Distinct from an
    /// envelope that parses but fails the three-tier content parse,
    /// which is an engine-level concern, not a provider one.
    #[error("LLM response was malformed: {0}")]
    Malformed(String),
}

/// The model collaborator (`spec.md` §6.1).
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        temperature: f32,
        tools: Option<&[ToolDefinition]>,
        response_format: Option<&ResponseFormat>,
    ) -> Result<ChatResponse, LlmError>;
}

/// Optional in-prompt retrieval collaborator (`spec.md` §6.1). Retrieval
/// failures degrade silently — callers treat `Err` the same as `Ok(vec![])`.
#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<KnowledgeHit>, LlmError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeHit {
    pub doc_id: String,
    pub text: String,
    pub score: f32,
}

/// Opaque per-provider metadata the engine does not interpret, kept for
/// providers that need request-scoped routing hints.
pub type ProviderMetadata = HashMap<String, String>;
