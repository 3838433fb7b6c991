use super::tracker::TrackerConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration of the `wire_track` tool.
#[derive(Clone, Debug, Deserialize)]
pub struct TrackToolConfig {
    /// Frame images in sequence order.
    pub inputs: Vec<PathBuf>,
    pub seed: SeedConfig,
    #[serde(default)]
    pub start_frame: usize,
    /// Frames to process; all remaining inputs when absent.
    #[serde(default)]
    pub frame_count: Option<usize>,
    #[serde(default)]
    pub tracker: TrackerConfig,
    pub output: TrackOutputConfig,
}

/// Seed of a run, either as edge rows or as a rough strip centre whose
/// edges are searched in the start frame.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SeedConfig {
    Edges {
        wire_id: String,
        #[serde(default)]
        x: usize,
        y_upper: f64,
        y_lower: f64,
    },
    Center {
        wire_id: String,
        #[serde(default)]
        x: usize,
        center_row: f64,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct TrackOutputConfig {
    pub report_json: PathBuf,
}

impl TrackToolConfig {
    pub fn frame_count(&self) -> usize {
        self.frame_count
            .unwrap_or_else(|| self.inputs.len().saturating_sub(self.start_frame))
    }
}

pub fn load_config(path: &Path) -> Result<TrackToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
