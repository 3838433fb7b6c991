//! Multi-frame driver, frame sources and the track report.
pub mod driver;
pub mod report;
pub mod source;

pub use driver::{
    run_tracks, track, CancelFlag, FrameTracker, ParallelOptions, SequenceDriver, TrackJob,
};
pub use report::{FrameSeries, ResumePoint, TrackFailure, TrackReport, WireSeries};
pub use source::{FileSource, FrameSource, SliceSource};
