//! Ceilings and window sizes of the template tracker.
//!
//! The defaults are the constants the tracker was tuned with. They are kept
//! configurable so corridors with a different strip width can be tracked
//! without a rebuild.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateParams {
    /// Profile half-length; a profile covers `2 * half_window + 1` rows.
    pub half_window: usize,
    /// Number of accepted profiles averaged into a template.
    pub template_depth: usize,
    /// Match search radius (px) around the previous position.
    pub search_radius: usize,
    /// Displacement (px) of the best match that counts as a skip.
    pub skip_limit: f64,
    /// SAD above which a match counts as a diff error.
    pub diff_ceiling: f64,
    /// Profile std below which the edge counts as flat.
    pub flatness_floor: f64,
    pub min_width: f64,
    pub max_width: f64,
    /// Largest row separation between a detected pair's edges.
    pub pair_separation_max: usize,
    /// SAD ceiling for a secondary candidate against the primary template.
    pub detection_ceiling: f64,
    /// Small-width count above which a wire is reset.
    pub small_width_reset: u32,
    /// Large-width count above which a wire is reset.
    pub large_width_reset: u32,
    /// Missing-streak count at which a wire is reset.
    pub missing_streak_reset: u32,
    /// Accepted positions kept for the trend fallback and the rolling centre.
    pub trend_window: usize,
    /// The secondary detector runs on columns divisible by this period.
    pub detector_period: usize,
    /// Offsets (px) outside the primary pair scanned for a splice duplicate.
    pub splice_band: (usize, usize),
    /// Offsets (px) outside the primary pair scanned for an air-gap duplicate.
    pub air_gap_band: (usize, usize),
}

impl Default for TemplateParams {
    fn default() -> Self {
        Self {
            half_window: 7,
            template_depth: 10,
            search_radius: 5,
            skip_limit: 2.0,
            diff_ceiling: 200.0,
            flatness_floor: 10.0,
            min_width: 2.0,
            max_width: 28.0,
            pair_separation_max: 35,
            detection_ceiling: 200.0,
            small_width_reset: 150,
            large_width_reset: 150,
            missing_streak_reset: 100,
            trend_window: 5,
            detector_period: 5,
            splice_band: (4, 60),
            air_gap_band: (60, 240),
        }
    }
}

impl TemplateParams {
    pub fn profile_len(&self) -> usize {
        2 * self.half_window + 1
    }
}
