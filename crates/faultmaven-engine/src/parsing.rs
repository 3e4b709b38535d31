//! Three-tier LLM response parsing (`spec.md` §4.1 step 8).

use faultmaven_contracts::ChatResponse;
use faultmaven_types::{HypothesisCategory, Phase};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// The canonical machine interface between prompt and engine
/// (`spec.md` §6.3): field names here are part of the system contract.
#[derive(Debug, Clone, Deserialize)]
pub struct StructuredEnvelope {
    #[serde(default)]
    pub reply: String,
    #[serde(default)]
    pub milestones_completed: Vec<String>,
    #[serde(default)]
    pub hypotheses: Vec<HypothesisProposal>,
    #[serde(default)]
    pub evidence_links: Vec<EvidenceLinkProposal>,
    #[serde(default)]
    pub suggested_phase: Option<Phase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HypothesisProposal {
    pub statement: String,
    #[serde(default)]
    pub category: Option<HypothesisCategory>,
    #[serde(default = "default_likelihood")]
    pub likelihood: f64,
}

fn default_likelihood() -> f64 {
    0.5
}

/// One piece of evidence and the hypotheses it bears on
/// (`spec.md` §4.1 step 7: `evidence_links[]{evidence_id, supports[], refutes[]}`).
#[derive(Debug, Clone, Deserialize)]
pub struct EvidenceLinkProposal {
    pub evidence_id: String,
    #[serde(default)]
    pub supports: Vec<String>,
    #[serde(default)]
    pub refutes: Vec<String>,
}

/// Which tier produced a [`ParsedTurn`], kept for logging and the
/// scenario tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseTier {
    Structured,
    EmbeddedJson,
    KeywordFallback,
}

#[derive(Debug, Clone)]
pub struct ParsedTurn {
    pub reply: String,
    pub milestones_completed: Vec<String>,
    pub hypotheses: Vec<HypothesisProposal>,
    pub evidence_links: Vec<EvidenceLinkProposal>,
    pub suggested_phase: Option<Phase>,
    pub tier: ParseTier,
}

impl From<(StructuredEnvelope, ParseTier)> for ParsedTurn {
    fn from((envelope, tier): (StructuredEnvelope, ParseTier)) -> Self {
        Self {
            reply: envelope.reply,
            milestones_completed: envelope.milestones_completed,
            hypotheses: envelope.hypotheses,
            evidence_links: envelope.evidence_links,
            suggested_phase: envelope.suggested_phase,
            tier,
        }
    }
}

pub(crate) static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("static regex is valid")
});

/// `(trigger phrases, milestone key)` pairs, checked in the order given in
/// `spec.md` §4.1 step 8. This mapping is frozen per `SPEC_FULL.md` §12
/// (Open Question 2) — changing it is a behavior change.
pub const TIER3_KEYWORDS: &[(&[&str], &str)] = &[
    (&["symptom", "reproduce"], "symptom_verified"),
    (&["scope", "affected"], "scope_confirmed"),
    (&["timeline", "started at"], "timeline_reconstructed"),
    (&["root cause"], "root_cause_identified"),
    (&["fix", "mitigation", "workaround"], "solution_proposed"),
    (&["verified", "confirmed fix"], "solution_verified"),
];

/// Parse a model reply through the three tiers in order, falling through on
/// failure (`spec.md` §4.1 step 8, "Failure semantics").
///
/// # Errors
/// Returns [`crate::EngineError::LlmMalformed`] only when Tier-3 yields
/// nothing *and* the reply text is empty.
pub fn parse_response(response: &ChatResponse) -> Result<ParsedTurn, crate::EngineError> {
    if let Some(parsed) = &response.parsed {
        if let Ok(envelope) = serde_json::from_value::<StructuredEnvelope>(parsed.clone()) {
            return Ok((envelope, ParseTier::Structured).into());
        }
    }

    if let Some(captures) = FENCED_JSON.captures(&response.content) {
        if let Some(json_block) = captures.get(1) {
            if let Ok(envelope) = serde_json::from_str::<StructuredEnvelope>(json_block.as_str()) {
                return Ok((envelope, ParseTier::EmbeddedJson).into());
            }
        }
    }

    let tier3 = keyword_fallback(&response.content);
    if tier3.milestones_completed.is_empty()
        && tier3.hypotheses.is_empty()
        && response.content.trim().is_empty()
    {
        return Err(crate::EngineError::LlmMalformed(
            "empty reply with no recognizable tier-3 keywords".to_string(),
        ));
    }
    Ok(tier3)
}

fn keyword_fallback(content: &str) -> ParsedTurn {
    let lower = content.to_lowercase();
    let mut milestones_completed = Vec::new();
    for (phrases, milestone) in TIER3_KEYWORDS {
        if phrases.iter().any(|p| lower.contains(p)) {
            milestones_completed.push((*milestone).to_string());
        }
    }

    let hypotheses = if milestones_completed.contains(&"root_cause_identified".to_string()) {
        vec![HypothesisProposal {
            statement: content.trim().to_string(),
            category: Some(faultmaven_hypothesis::infer_category(content)),
            likelihood: 0.5,
        }]
    } else {
        Vec::new()
    };

    ParsedTurn {
        reply: content.to_string(),
        milestones_completed,
        hypotheses,
        evidence_links: Vec::new(),
        suggested_phase: None,
        tier: ParseTier::KeywordFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultmaven_contracts::Usage;

    fn response(content: &str, parsed: Option<serde_json::Value>) -> ChatResponse {
        ChatResponse {
            content: content.to_string(),
            parsed,
            tool_calls: Vec::new(),
            usage: Usage::default(),
        }
    }

    #[test]
    fn tier1_parses_structured_envelope() {
        let envelope = serde_json::json!({
            "reply": "ok",
            "milestones_completed": ["scope_confirmed"],
            "hypotheses": [],
            "evidence_links": [],
        });
        let parsed = parse_response(&response("ignored", Some(envelope))).unwrap();
        assert_eq!(parsed.tier, ParseTier::Structured);
        assert_eq!(parsed.milestones_completed, vec!["scope_confirmed".to_string()]);
    }

    #[test]
    fn tier2_extracts_fenced_json_block() {
        let content = "Here's my analysis:\n```json\n{\"reply\": \"hi\", \"milestones_completed\": [\"symptom_verified\"]}\n```\nThanks.";
        let parsed = parse_response(&response(content, None)).unwrap();
        assert_eq!(parsed.tier, ParseTier::EmbeddedJson);
        assert_eq!(parsed.reply, "hi");
    }

    #[test]
    fn tier3_maps_keywords_to_milestones() {
        let content = "Let's confirm the scope and affected systems before a fix.";
        let parsed = parse_response(&response(content, None)).unwrap();
        assert_eq!(parsed.tier, ParseTier::KeywordFallback);
        assert!(parsed.milestones_completed.contains(&"scope_confirmed".to_string()));
        assert!(parsed.milestones_completed.contains(&"solution_proposed".to_string()));
    }

    #[test]
    fn empty_reply_with_no_keywords_is_malformed() {
        let err = parse_response(&response("", None)).unwrap_err();
        assert!(matches!(err, crate::EngineError::LlmMalformed(_)));
    }
}
