//! Unexpected faults raised by the tracking core.
//!
//! Terminal track conditions (missing-count, width, out-of-sight) are not
//! errors: they are reported as [`crate::types::Termination`] data. The
//! variants here cover malformed input and frame acquisition failures.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("seed column {x} is outside a frame of width {width}")]
    SeedColumnOutOfBounds { x: usize, width: usize },

    #[error("invalid seed: upper edge {upper} must lie above lower edge {lower}")]
    InvertedSeed { upper: f64, lower: f64 },

    #[error("invalid seed: edge rows ({upper}, {lower}) must be finite")]
    NonFiniteSeed { upper: f64, lower: f64 },

    #[error("no edge pair found around row {center_row} at column {column}")]
    EdgeSearchFailed { column: usize, center_row: f64 },

    #[error("frame {index} requested but the source holds {available} frames")]
    FrameIndexOutOfRange { index: usize, available: usize },

    #[error("failed to acquire frame {index}: {reason}")]
    FrameAcquisition { index: usize, reason: String },

    #[error("non-finite filter state at column {column}")]
    NonFiniteState { column: usize },
}
