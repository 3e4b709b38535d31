//! Category inference via lexical keyword matching (`spec.md` §4.2).
//!
//! The keyword lists are frozen per `SPEC_FULL.md` §12 (Open Question 1):
//! changing them is a behavior change, not a tuning knob, so they live as
//! code rather than configuration.

use faultmaven_types::HypothesisCategory;

/// `(category, keywords)` pairs, checked in order; the first category with
/// a matching keyword wins. Order matters for statements matching more than
/// one category's keywords.
#[must_use]
pub fn keyword_table() -> Vec<(HypothesisCategory, &'static [&'static str])> {
    vec![
        (
            HypothesisCategory::Infrastructure,
            &[
                "disk",
                "memory",
                "cpu",
                "network",
                "server",
                "cluster",
                "load balancer",
                "dns",
                "firewall",
                "container",
                "kubernetes",
                "pod",
            ],
        ),
        (
            HypothesisCategory::Code,
            &[
                "bug",
                "exception",
                "null pointer",
                "race condition",
                "deadlock",
                "regression",
                "stack trace",
                "function",
                "method",
                "logic error",
            ],
        ),
        (
            HypothesisCategory::Config,
            &[
                "config",
                "configuration",
                "environment variable",
                "flag",
                "setting",
                "feature flag",
                "misconfigured",
                "yaml",
                "toml",
            ],
        ),
        (
            HypothesisCategory::Data,
            &[
                "database",
                "query",
                "schema",
                "migration",
                "index",
                "corruption",
                "data integrity",
                "table",
                "record",
            ],
        ),
        (
            HypothesisCategory::External,
            &[
                "third-party",
                "vendor",
                "upstream",
                "api outage",
                "external service",
                "dependency",
                "provider",
            ],
        ),
        (
            HypothesisCategory::Human,
            &[
                "deploy",
                "deployment",
                "manual change",
                "operator error",
                "fat-fingered",
                "mistake",
                "rollback",
                "runbook",
            ],
        ),
    ]
}

/// Infer a category from a hypothesis statement by lexical match, falling
/// back to `UNKNOWN` if no keyword matches (`spec.md` §4.2). Uses the
/// frozen built-in table.
#[must_use]
pub fn infer_category(statement: &str) -> HypothesisCategory {
    infer_category_with_table(statement, None)
}

/// Same as [`infer_category`], but honors an `EngineConfig::category_keywords`
/// override when present (`SPEC_FULL.md` §12, Open Question 1). Categories
/// absent from the override table fall through to the built-in list for
/// that category.
#[must_use]
pub fn infer_category_with_table(
    statement: &str,
    overrides: Option<&std::collections::BTreeMap<HypothesisCategory, Vec<String>>>,
) -> HypothesisCategory {
    let lower = statement.to_lowercase();
    for (category, default_keywords) in keyword_table() {
        let matched = match overrides.and_then(|o| o.get(&category)) {
            Some(custom) => custom.iter().any(|kw| lower.contains(kw.to_lowercase().as_str())),
            None => default_keywords.iter().any(|kw| lower.contains(kw)),
        };
        if matched {
            return category;
        }
    }
    HypothesisCategory::Unknown
}
