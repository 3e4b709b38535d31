//! The `Case` entity, owned by the host application.
//!
//! The engine only reads a handful of `Case` fields and writes
//! `case_metadata.investigation_state` (`spec.md` §3). The full case record
//! — ownership, message history, file attachments — belongs to the caller;
//! this module models only what the engine needs to reason about it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Consulting,
    Investigating,
    Documenting,
    Resolved,
    Closed,
}

impl CaseStatus {
    /// Hypothesis/evidence creation is forbidden once a case is resolved or
    /// closed (`spec.md` §3 invariants, §8 property 7).
    #[must_use]
    pub fn admits_new_findings(self) -> bool {
        !matches!(self, CaseStatus::Resolved | CaseStatus::Closed)
    }
}

/// A single message in the case's append-only conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub text: String,
    #[serde(default)]
    pub attachment_ids: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// The subset of the case record the engine reads and mutates.
///
/// `investigation_state` is the opaque blob the engine owns end to end; the
/// rest are fields the host persists but the engine treats as read-only
/// context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}
