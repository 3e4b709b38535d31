//! OODA Engine: maps `(phase, iteration)` to adaptive intensity
//! (`spec.md` §4.3).

use faultmaven_contracts::OodaConfig;
use faultmaven_types::{Intensity, Phase};

/// Which band of the table a given per-phase iteration count falls into.
fn band_index(phase_iteration: u64) -> usize {
    match phase_iteration {
        0 | 1 | 2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

/// The built-in `spec.md` §4.3 table, as `[1-2 iter, 3-5 iter, 6+ iter]`
/// rows per phase.
fn default_row(phase: Phase) -> [Intensity; 3] {
    use Intensity::{Full, Light, Medium, None as IntensityNone};
    match phase {
        Phase::Intake => [IntensityNone, IntensityNone, IntensityNone],
        Phase::BlastRadius | Phase::Timeline => [Light, Light, Medium],
        Phase::Hypothesis => [Light, Medium, Medium],
        Phase::Validation => [Medium, Medium, Full],
        Phase::Solution => [Medium, Medium, Medium],
        Phase::Document => [Light, Light, Light],
    }
}

/// `OE.intensity_for` (`spec.md` §4.3): look up intensity for the given
/// phase at the given per-phase iteration count, honoring a config
/// override row when present.
#[must_use]
pub fn intensity_for(phase: Phase, phase_iteration: u64, config: &OodaConfig) -> Intensity {
    let idx = band_index(phase_iteration);
    if let Some(table) = &config.intensity_table {
        if let Some(row) = table.get(&phase) {
            if let Some(&intensity) = row.get(idx) {
                return intensity;
            }
        }
    }
    default_row(phase)[idx]
}
