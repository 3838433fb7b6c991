//! Runtime configuration shared by both trackers.
//!
//! `Thresholds` carries the measurement and termination limits the caller
//! tunes per corridor. The filter noise model and the template ceilings live
//! in [`KalmanParams`] and [`TemplateParams`]; their defaults are the values
//! the trackers were calibrated with.
use crate::kalman::KalmanParams;
use crate::template::TemplateParams;
use serde::{Deserialize, Serialize};

/// Measurement and termination thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Maximum deviation (px) of a raw edge candidate from the expected row.
    pub missing_threshold: f64,
    /// Maximum jump of the inside brightness against the remembered value.
    pub brightness_diff_threshold: f64,
    /// Minimum gradient magnitude accepted as an edge.
    pub sharpness_threshold: f64,
    /// Accumulated missing count above which the recursive track stops.
    pub missing_count_limit: f64,
    /// Derived width (px) above which the recursive track stops.
    pub width_exceed_limit: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            missing_threshold: 5.0,
            brightness_diff_threshold: 255.0,
            sharpness_threshold: 1.0,
            missing_count_limit: 100.0,
            width_exceed_limit: 60.0,
        }
    }
}

/// Initial edge search around an operator-supplied strip centre.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSearch {
    /// Rows scanned on each side of the centre.
    pub half_height: usize,
}

impl Default for SeedSearch {
    fn default() -> Self {
        Self { half_height: 40 }
    }
}

/// Which column tracker drives a sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerMethod {
    #[default]
    Kalman,
    Template,
}

/// Full tracker configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub method: TrackerMethod,
    pub thresholds: Thresholds,
    pub seed_search: SeedSearch,
    pub kalman: KalmanParams,
    pub template: TemplateParams,
}

impl TrackerConfig {
    pub fn kalman() -> Self {
        Self::default()
    }

    pub fn template() -> Self {
        Self {
            method: TrackerMethod::Template,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: TrackerConfig = serde_json::from_str(
            r#"{ "method": "template", "thresholds": { "missing_count_limit": 12 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.method, TrackerMethod::Template);
        assert_eq!(cfg.thresholds.missing_count_limit, 12.0);
        assert_eq!(cfg.thresholds.missing_threshold, 5.0);
        assert_eq!(cfg.template, TemplateParams::default());
        assert_eq!(cfg.seed_search.half_height, 40);
    }

    #[test]
    fn nested_keys_are_snake_case() {
        let cfg: TrackerConfig = serde_json::from_str(
            r#"{
                "seed_search": { "half_height": 25 },
                "kalman": { "box_width": 12, "partial_miss": "scalar_update" },
                "template": { "detection_ceiling": 150.0, "air_gap_band": [50, 200] }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.seed_search.half_height, 25);
        assert_eq!(cfg.kalman.box_width, 12);
        assert_eq!(cfg.template.detection_ceiling, 150.0);
        assert_eq!(cfg.template.air_gap_band, (50, 200));
        let back = serde_json::to_value(&cfg).unwrap();
        assert!(back["thresholds"].get("missing_count_limit").is_some());
        assert!(back["template"].get("missingStreakReset").is_none());
    }
}
