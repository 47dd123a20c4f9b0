//! Engine configuration.

use lectio_core::DayBoundary;

/// Configuration for the reading engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Key the snapshot is stored under
    pub storage_key: String,
    /// EMA weight given to a new per-book pace sample
    pub smoothing_alpha: f64,
    /// Pace assumed for testament/global estimates before any time is logged
    pub default_vpm: f64,
    /// Where calendar days are cut for the streak
    pub day_boundary: DayBoundary,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: "reading_progress_v1".to_string(),
            smoothing_alpha: 0.3,
            default_vpm: 1.0,
            day_boundary: DayBoundary::Local,
        }
    }
}
