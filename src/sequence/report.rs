use crate::config::TrackerMethod;
use crate::diagnostics::TimingBreakdown;
use crate::error::TrackError;
use crate::types::{ColumnSample, Seed, Termination};
use crate::wires::WireSlot;
use serde::Serialize;
use thiserror::Error;

/// Column series of one wire in one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSeries {
    pub wire_id: String,
    pub slot: WireSlot,
    pub samples: Vec<ColumnSample>,
}

impl WireSeries {
    pub fn new(wire_id: impl Into<String>, slot: WireSlot, samples: Vec<ColumnSample>) -> Self {
        Self {
            wire_id: wire_id.into(),
            slot,
            samples,
        }
    }

    pub fn primary(wire_id: impl Into<String>, samples: Vec<ColumnSample>) -> Self {
        Self::new(wire_id, WireSlot::Primary, samples)
    }

    /// Columns with a finite edge pair.
    pub fn observed_columns(&self) -> usize {
        self.samples.iter().filter(|s| s.is_observed()).count()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSeries {
    pub frame_index: usize,
    /// All columns from the seed to the frame edge were processed.
    pub completed: bool,
    pub series: Vec<WireSeries>,
}

impl FrameSeries {
    pub fn primary(&self) -> Option<&WireSeries> {
        self.series.iter().find(|s| s.slot == WireSlot::Primary)
    }
}

/// Where a later run picks up: the next frame to process and its seed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePoint {
    pub frame_index: usize,
    pub seed: Seed,
}

/// Result of one (wire, frame range) track.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackReport {
    pub method: TrackerMethod,
    pub frames: Vec<FrameSeries>,
    pub frames_completed: usize,
    pub termination: Termination,
    pub cancelled: bool,
    pub resume: ResumePoint,
    pub timing: TimingBreakdown,
}

impl TrackReport {
    pub fn new(method: TrackerMethod, start_frame: usize, seed: Seed) -> Self {
        Self {
            method,
            frames: Vec::new(),
            frames_completed: 0,
            termination: Termination::None,
            cancelled: false,
            resume: ResumePoint {
                frame_index: start_frame,
                seed,
            },
            timing: TimingBreakdown::default(),
        }
    }

    /// Seed to continue the track with.
    pub fn last_seed(&self) -> &Seed {
        &self.resume.seed
    }

    /// Primary-wire samples of all frames, in frame then column order.
    pub fn primary_samples(&self) -> impl Iterator<Item = &ColumnSample> {
        self.frames
            .iter()
            .filter_map(FrameSeries::primary)
            .flat_map(|s| s.samples.iter())
    }
}

/// Unexpected fault during a run, with everything produced before it.
#[derive(Debug, Error)]
#[error("{error} (after {} completed frames)", .partial.frames_completed)]
pub struct TrackFailure {
    #[source]
    pub error: TrackError,
    pub partial: Box<TrackReport>,
}

impl TrackFailure {
    pub fn new(error: TrackError, partial: TrackReport) -> Self {
        Self {
            error,
            partial: Box::new(partial),
        }
    }
}
