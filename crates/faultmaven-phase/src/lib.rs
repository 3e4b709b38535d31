//! Phase Orchestrator: forward progression and loop-back detection
//! (`spec.md` §4.5).

pub mod loopback;
pub mod progression;

pub use loopback::{apply as apply_loopback, detect as detect_loopback, LoopbackDecision, LoopbackOutcome, LoopbackSignals};
pub use progression::next_phase;
