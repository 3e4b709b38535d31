//! Hypothesis Manager: category inference, confidence model, lifecycle
//! transitions, and anchoring-bias detection (`spec.md` §4.2).

pub mod anchoring;
pub mod category;
pub mod confidence;
pub mod lifecycle;

pub use anchoring::{detect, detect_and_mitigate, mitigate, AnchoringReport, AnchoringTrigger};
pub use category::{infer_category, infer_category_with_table, keyword_table};
pub use confidence::{advance_stagnation_counter, apply_stagnation_decay, recompute_after_evidence_link};
pub use lifecycle::{apply_auto_transitions, create_hypothesis, link_evidence, HypothesisSource};
