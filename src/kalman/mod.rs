//! Recursive (Kalman-style) edge tracker.
//!
//! State is `[upper, lower, slope]` advanced one column at a time with a
//! constant-slope transition. Each column is read by the shared
//! [`crate::measure::ColumnExtractor`]; readings flagged missing are folded
//! into the observation according to [`PartialMissPolicy`].
pub mod filter;
pub mod params;
pub mod tracker;

pub use filter::{Correction, EdgeObservation, Observation, StateFilter};
pub use params::{KalmanParams, PartialMissPolicy};
pub use tracker::KalmanTracker;
