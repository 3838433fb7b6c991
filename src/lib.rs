#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod sequence;
pub mod types;

// Tracker internals, public for tools and tests.
pub mod kalman;
pub mod measure;
pub mod template;
pub mod wires;

// --- High-level re-exports -------------------------------------------------

pub use crate::config::{Thresholds, TrackerConfig, TrackerMethod};
pub use crate::error::TrackError;
pub use crate::sequence::{
    run_tracks, track, CancelFlag, SequenceDriver, TrackFailure, TrackJob, TrackReport,
};
pub use crate::types::{ColumnSample, Seed, Termination};

// Column trackers, for callers that drive frames themselves.
pub use crate::kalman::KalmanTracker;
pub use crate::wires::TemplateTracker;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use trolley_tracker::prelude::*;
///
/// # fn main() {
/// let (w, h) = (1000usize, 2048usize);
/// let gray = vec![0u8; w * h];
/// let frame = ImageU8::try_new(w, h, w, &gray).unwrap();
///
/// let seed = Seed::new("trolley1", 0, 970.0, 1000.0);
/// let report = track(&[frame], seed, 1, &TrackerConfig::kalman()).unwrap();
/// println!("completed={} termination={:?}", report.frames_completed, report.termination);
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageU8;
    pub use crate::sequence::{track, CancelFlag, TrackReport};
    pub use crate::{Seed, Termination, TrackerConfig};
}
