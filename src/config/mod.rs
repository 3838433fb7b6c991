//! Serde-backed configuration: tracker settings and the tool config.
//!
//! Config files use snake_case keys throughout; reports are camelCase.
pub mod tool;
pub mod tracker;

pub use tool::{load_config, SeedConfig, TrackOutputConfig, TrackToolConfig};
pub use tracker::{SeedSearch, Thresholds, TrackerConfig, TrackerMethod};
