//! In-memory test doubles for the collaborator traits in
//! `faultmaven_contracts` (`spec.md` §6.1). Used by this crate's own unit
//! tests and by the scenario tests under `tests/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use faultmaven_contracts::{
    ChatMessage, ChatResponse, Clock, KnowledgeHit, KnowledgeSearch, LLMProvider, LlmError,
    ResponseFormat, StateStore, StoreError, ToolDefinition, Usage,
};
use faultmaven_types::InvestigationState;
use std::sync::Mutex;

/// Replays a fixed sequence of responses, one per call to `chat`. Panics if
/// exhausted — tests should queue exactly as many replies as turns driven.
pub struct FakeLlmProvider {
    replies: Mutex<Vec<Result<ChatResponse, LlmError>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeLlmProvider {
    #[must_use]
    pub fn new(replies: Vec<Result<ChatResponse, LlmError>>) -> Self {
        // Queued in call order; popped from the back, so reverse once up front.
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn text(content: &str) -> Result<ChatResponse, LlmError> {
        Ok(ChatResponse {
            content: content.to_string(),
            parsed: None,
            tool_calls: Vec::new(),
            usage: Usage::default(),
        })
    }

    #[must_use]
    pub fn structured(envelope: serde_json::Value) -> Result<ChatResponse, LlmError> {
        Ok(ChatResponse {
            content: String::new(),
            parsed: Some(envelope),
            tool_calls: Vec::new(),
            usage: Usage::default(),
        })
    }

    /// Number of prompts this fake has received so far, for call-count
    /// assertions in the OODA-intensity scenario tests.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("fake lock poisoned").len()
    }

    /// The full text (system + user messages joined) of the most recent
    /// call, for prompt-content assertions.
    #[must_use]
    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().expect("fake lock poisoned").last().cloned()
    }
}

#[async_trait]
impl LLMProvider for FakeLlmProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        _model: &str,
        _temperature: f32,
        _tools: Option<&[ToolDefinition]>,
        _response_format: Option<&ResponseFormat>,
    ) -> Result<ChatResponse, LlmError> {
        let prompt = messages
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.calls.lock().expect("fake lock poisoned").push(prompt);
        self.replies
            .lock()
            .expect("fake lock poisoned")
            .pop()
            .unwrap_or_else(|| panic!("FakeLlmProvider exhausted: no queued reply for this call"))
    }
}

/// Single-case in-memory store. Good enough for driving `process_turn` in a
/// loop across several turns within one test.
#[derive(Default)]
pub struct FakeStateStore {
    state: Mutex<Option<InvestigationState>>,
    fail_next_save: Mutex<bool>,
}

impl FakeStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn seeded(state: InvestigationState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            fail_next_save: Mutex::new(false),
        }
    }

    /// The next `save` call returns `Err(StoreError::LeaseLost)` without
    /// mutating the stored state, for the lease-loss scenario test.
    pub fn fail_next_save(&self) {
        *self.fail_next_save.lock().expect("fake lock poisoned") = true;
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<InvestigationState> {
        self.state.lock().expect("fake lock poisoned").clone()
    }
}

#[async_trait]
impl StateStore for FakeStateStore {
    async fn load(&self, _case_id: &str) -> Result<Option<InvestigationState>, StoreError> {
        Ok(self.state.lock().expect("fake lock poisoned").clone())
    }

    async fn save(&self, case_id: &str, state: &InvestigationState) -> Result<(), StoreError> {
        let mut fail = self.fail_next_save.lock().expect("fake lock poisoned");
        if *fail {
            *fail = false;
            return Err(StoreError::LeaseLost {
                case_id: case_id.to_string(),
            });
        }
        *self.state.lock().expect("fake lock poisoned") = Some(state.clone());
        Ok(())
    }
}

/// Returns a fixed instant, advanced one second per call so `turn_history`
/// timestamps stay strictly increasing without relying on wall-clock time.
pub struct FixedClock {
    start: DateTime<Utc>,
    ticks: Mutex<u64>,
}

impl FixedClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            ticks: Mutex::new(0),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let mut ticks = self.ticks.lock().expect("fake lock poisoned");
        let at = self.start + chrono::Duration::seconds(i64::try_from(*ticks).unwrap_or(i64::MAX));
        *ticks += 1;
        at
    }
}

/// A `KnowledgeSearch` double that always returns a fixed set of hits.
pub struct FakeKnowledgeSearch {
    hits: Vec<KnowledgeHit>,
}

impl FakeKnowledgeSearch {
    #[must_use]
    pub fn new(hits: Vec<KnowledgeHit>) -> Self {
        Self { hits }
    }
}

#[async_trait]
impl KnowledgeSearch for FakeKnowledgeSearch {
    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<KnowledgeHit>, LlmError> {
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}
