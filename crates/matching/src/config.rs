use serde::{Deserialize, Serialize};

/// Tunables for building/listing association.
///
/// The defaults were tuned for a single dense city district; they are
/// configuration, not law.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Tier-2 search radius around a building centroid, in degrees (~222 m).
    pub radius_deg: f64,
    /// How many nearest listings tier 3 returns.
    pub fallback_count: usize,
    /// Max listing→centroid distance when recoloring, in degrees (~111 m).
    pub building_threshold_deg: f64,
    /// Half-size of the square probed around a projected listing, in pixels.
    pub probe_buffer_px: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            radius_deg: 0.002,
            fallback_count: 3,
            building_threshold_deg: 0.001,
            probe_buffer_px: 10.0,
        }
    }
}
