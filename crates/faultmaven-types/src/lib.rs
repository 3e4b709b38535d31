//! Data model for the FaultMaven Investigation Engine.
//!
//! This crate holds only types and the small set of pure, side-effect-free
//! helper methods that follow directly from those types' invariants
//! (construction, clamping, stance inference, priority ordering). The
//! algorithms that mutate an [`state::InvestigationState`] across a turn —
//! confidence recompute, anchoring detection, memory compression, phase
//! progression — live in their own crates (`faultmaven-hypothesis`,
//! `faultmaven-memory`, `faultmaven-ooda`, `faultmaven-phase`,
//! `faultmaven-engine`) so each can be tested in isolation.

pub mod case;
pub mod conclusion;
pub mod evidence;
pub mod hypothesis;
pub mod memory;
pub mod milestones;
pub mod phase;
pub mod progress;
pub mod state;
pub mod turn;

pub use case::{Case, CaseStatus, Message, MessageRole};
pub use conclusion::WorkingConclusion;
pub use evidence::{Evidence, EvidenceCategory, EvidenceSourceType};
pub use hypothesis::{ConfidencePoint, Hypothesis, HypothesisCategory, HypothesisStatus};
pub use memory::{HierarchicalMemory, MemorySnapshot, MemoryTier};
pub use milestones::{Milestones, MILESTONE_KEYS};
pub use phase::{Intensity, OODAState, Phase};
pub use progress::{DegradedModeData, InvestigationMomentum, ProgressMetrics};
pub use state::{InvestigationState, Strategy, TemporalState, UrgencyLevel, SCHEMA_VERSION};
pub use turn::{TurnOutcomeKind, TurnRecord, TurnRole};
