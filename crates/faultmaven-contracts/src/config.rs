//! Engine configuration (`spec.md` §6.4).
//!
//! Thresholds, budgets, and timeouts are injected rather than hardcoded
//! (`spec.md` §5, "Shared resource policy"). Built with the `with_*`
//! builder style the teacher uses for its request/approval types.

use faultmaven_types::{HypothesisCategory, Phase};
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-phase OODA intensity, overriding the §4.3 default table.
pub type IntensityTable = BTreeMap<Phase, Vec<faultmaven_types::Intensity>>;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub timeout: Duration,
    pub default_temperature: f32,
    pub validation_temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            default_temperature: 0.7,
            validation_temperature: 0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryConfig {
    pub max_context_tokens: u32,
    pub compression_every_n_turns: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: 1600,
            compression_every_n_turns: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HypothesisConfig {
    pub validate_threshold: f64,
    pub refute_threshold: f64,
    pub decay_factor: f64,
    pub decay_per_iter_min_delta: f64,
}

impl Default for HypothesisConfig {
    fn default() -> Self {
        Self {
            validate_threshold: 0.70,
            refute_threshold: 0.20,
            decay_factor: 0.85,
            decay_per_iter_min_delta: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnchoringConfig {
    pub same_category_limit: u32,
    pub stagnation_iterations: u32,
}

impl Default for AnchoringConfig {
    fn default() -> Self {
        Self {
            same_category_limit: 4,
            stagnation_iterations: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhaseConfig {
    pub loopback_max: u32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self { loopback_max: 3 }
    }
}

#[derive(Debug, Clone)]
pub struct DegradedConfig {
    pub turns_threshold: u32,
}

impl Default for DegradedConfig {
    fn default() -> Self {
        Self { turns_threshold: 3 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OodaConfig {
    /// `None` uses the built-in §4.3 table.
    pub intensity_table: Option<IntensityTable>,
}

/// All recognized engine configuration (`spec.md` §6.4). Constructed via
/// [`EngineConfig::builder`]; every field has the documented default.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub llm: LlmConfig,
    pub memory: MemoryConfig,
    pub hypothesis: HypothesisConfig,
    pub anchoring: AnchoringConfig,
    pub phase: PhaseConfig,
    pub degraded: DegradedConfig,
    pub ooda: OodaConfig,
    /// Overrides the built-in category keyword table
    /// (`faultmaven_hypothesis::category::keyword_table`). `None` uses the
    /// built-in table.
    pub category_keywords: Option<BTreeMap<HypothesisCategory, Vec<String>>>,
}

impl EngineConfig {
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for [`EngineConfig`]. Each `with_*` overrides a whole
/// sub-config; fields not overridden keep their `Default` values.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    #[must_use]
    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.config.llm = llm;
        self
    }

    #[must_use]
    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    #[must_use]
    pub fn with_hypothesis(mut self, hypothesis: HypothesisConfig) -> Self {
        self.config.hypothesis = hypothesis;
        self
    }

    #[must_use]
    pub fn with_anchoring(mut self, anchoring: AnchoringConfig) -> Self {
        self.config.anchoring = anchoring;
        self
    }

    #[must_use]
    pub fn with_phase(mut self, phase: PhaseConfig) -> Self {
        self.config.phase = phase;
        self
    }

    #[must_use]
    pub fn with_degraded(mut self, degraded: DegradedConfig) -> Self {
        self.config.degraded = degraded;
        self
    }

    #[must_use]
    pub fn with_ooda_intensity_table(mut self, table: IntensityTable) -> Self {
        self.config.ooda.intensity_table = Some(table);
        self
    }

    #[must_use]
    pub fn with_category_keywords(mut self, table: BTreeMap<HypothesisCategory, Vec<String>>) -> Self {
        self.config.category_keywords = Some(table);
        self
    }

    #[must_use]
    pub fn build(self) -> EngineConfig {
        self.config
    }
}
