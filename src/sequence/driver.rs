//! Frame loop shared by both trackers.
//!
//! Each frame is processed from the seed column to the right frame edge.
//! The next frame's seed is the tracker's final estimate with the column
//! reset to 0. A terminal condition stops the run after recording the
//! partial frame; cancellation is checked before every frame so a frame is
//! never interrupted halfway.
use super::report::{FrameSeries, ResumePoint, TrackFailure, TrackReport, WireSeries};
use super::source::{FrameSource, SliceSource};
use crate::config::{TrackerConfig, TrackerMethod};
use crate::error::TrackError;
use crate::image::ImageU8;
use crate::kalman::KalmanTracker;
use crate::measure::locate_edges;
use crate::types::{Seed, Termination};
use crate::wires::TemplateTracker;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Column tracker driven by [`SequenceDriver`].
pub trait FrameTracker {
    fn method(&self) -> TrackerMethod;

    /// Prepare for a new frame starting at `seed`.
    fn begin_frame(&mut self, seed: &Seed);

    /// Process one column; a terminal return ends the frame.
    fn step(&mut self, frame: &ImageU8<'_>, column: usize) -> Result<Termination, TrackError>;

    /// Frame-end bookkeeping, called only when no column terminated.
    fn end_frame(&mut self) -> Termination;

    /// Drain the series recorded since `begin_frame`.
    fn take_series(&mut self) -> Vec<WireSeries>;

    /// Seed for the frame after the current one.
    fn next_seed(&self, previous: &Seed) -> Seed;
}

/// Cooperative cancellation shared between a caller and running tracks.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SequenceDriver {
    config: TrackerConfig,
}

impl SequenceDriver {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Fresh tracker of the configured method.
    pub fn tracker_for(&self, seed: &Seed) -> Box<dyn FrameTracker> {
        match self.config.method {
            TrackerMethod::Kalman => Box::new(KalmanTracker::new(
                seed,
                self.config.kalman.clone(),
                self.config.thresholds.clone(),
            )),
            TrackerMethod::Template => {
                Box::new(TemplateTracker::new(seed, self.config.template.clone()))
            }
        }
    }

    /// Seed of `wire_id` at column `x` of frame `frame_index`, with the edge
    /// rows searched around `center_row`.
    pub fn locate_seed<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        frame_index: usize,
        wire_id: &str,
        x: usize,
        center_row: f64,
    ) -> Result<Seed, TrackError> {
        let frame = source.frame(frame_index)?;
        frame.validate()?;
        if x >= frame.w {
            return Err(TrackError::SeedColumnOutOfBounds { x, width: frame.w });
        }
        let [upper, lower] = locate_edges(
            &frame,
            x,
            center_row,
            self.config.seed_search.half_height,
            self.config.thresholds.sharpness_threshold,
        )
        .ok_or(TrackError::EdgeSearchFailed {
            column: x,
            center_row,
        })?;
        info!(
            "SequenceDriver::locate_seed wire={} frame={} column={} edges=({}, {})",
            wire_id, frame_index, x, upper, lower
        );
        Ok(Seed::new(wire_id, x, upper as f64, lower as f64))
    }

    /// Track `seed` over `frame_count` frames starting at `start_frame`.
    ///
    /// Frames beyond the end of `source` are not requested; the report then
    /// simply holds fewer frames.
    pub fn run<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        seed: Seed,
        start_frame: usize,
        frame_count: usize,
        cancel: &CancelFlag,
    ) -> Result<TrackReport, TrackFailure> {
        let started = Instant::now();
        let mut report = TrackReport::new(self.config.method, start_frame, seed.clone());
        if !(seed.y_upper.is_finite() && seed.y_lower.is_finite()) {
            let err = TrackError::NonFiniteSeed {
                upper: seed.y_upper,
                lower: seed.y_lower,
            };
            return Err(TrackFailure::new(err, report));
        }
        if seed.y_upper >= seed.y_lower {
            let err = TrackError::InvertedSeed {
                upper: seed.y_upper,
                lower: seed.y_lower,
            };
            return Err(TrackFailure::new(err, report));
        }

        let end = start_frame
            .saturating_add(frame_count)
            .min(source.frame_count());
        if end < start_frame.saturating_add(frame_count) {
            warn!(
                "SequenceDriver::run requested {} frames from {} but the source holds {}",
                frame_count,
                start_frame,
                source.frame_count()
            );
        }

        let mut tracker = self.tracker_for(&seed);
        let mut seed = seed;
        for index in start_frame..end {
            if cancel.is_cancelled() {
                info!(
                    "SequenceDriver::run wire={} cancelled before frame {}",
                    seed.wire_id, index
                );
                report.cancelled = true;
                break;
            }
            let frame_started = Instant::now();
            let frame = match source.frame(index).and_then(|f| f.validate().map(|_| f)) {
                Ok(frame) => frame,
                Err(err) => return Err(fail(err, report, started)),
            };
            if seed.x >= frame.w {
                let err = TrackError::SeedColumnOutOfBounds {
                    x: seed.x,
                    width: frame.w,
                };
                return Err(fail(err, report, started));
            }

            tracker.begin_frame(&seed);
            let mut termination = Termination::None;
            let mut fault = None;
            let mut columns = 0;
            for column in seed.x..frame.w {
                columns += 1;
                match tracker.step(&frame, column) {
                    Ok(t) if t.is_terminal() => {
                        termination = t;
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        fault = Some(err);
                        break;
                    }
                }
            }
            if fault.is_none() && !termination.is_terminal() {
                termination = tracker.end_frame();
            }

            let completed = fault.is_none() && !termination.is_terminal();
            report.frames.push(FrameSeries {
                frame_index: index,
                completed,
                series: tracker.take_series(),
            });
            report.timing.record(
                index,
                columns,
                frame_started.elapsed().as_secs_f64() * 1000.0,
            );
            if let Some(err) = fault {
                return Err(fail(err, report, started));
            }
            if termination.is_terminal() {
                warn!(
                    "SequenceDriver::run wire={} frame={} {}",
                    seed.wire_id,
                    index,
                    termination.describe()
                );
                report.termination = termination;
                break;
            }

            report.frames_completed += 1;
            seed = tracker.next_seed(&seed);
            debug!(
                "SequenceDriver::run wire={} frame={} done, next seed ({:.2}, {:.2})",
                seed.wire_id, index, seed.y_upper, seed.y_lower
            );
            report.resume = ResumePoint {
                frame_index: index + 1,
                seed: seed.clone(),
            };
        }

        report.timing.total_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(
            "SequenceDriver::run wire={} method={:?} frames_completed={} termination={:?} cancelled={} total_ms={:.1}",
            report.resume.seed.wire_id,
            report.method,
            report.frames_completed,
            report.termination,
            report.cancelled,
            report.timing.total_ms
        );
        Ok(report)
    }
}

fn fail(err: TrackError, mut report: TrackReport, started: Instant) -> TrackFailure {
    warn!("SequenceDriver::run aborted: {err}");
    report.timing.total_ms = started.elapsed().as_secs_f64() * 1000.0;
    TrackFailure::new(err, report)
}

/// Track `seed` over the first `frame_count` of `frames`.
pub fn track(
    frames: &[ImageU8<'_>],
    seed: Seed,
    frame_count: usize,
    config: &TrackerConfig,
) -> Result<TrackReport, TrackFailure> {
    SequenceDriver::new(config.clone()).run(
        &mut SliceSource::new(frames),
        seed,
        0,
        frame_count,
        &CancelFlag::new(),
    )
}

/// One independent (camera, wire) track.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackJob {
    pub seed: Seed,
    pub start_frame: usize,
    pub frame_count: usize,
}

/// Options controlling concurrent execution of independent tracks.
#[derive(Clone, Copy, Debug)]
pub struct ParallelOptions {
    /// Enable parallel execution (requires the `parallel` feature).
    pub enabled: bool,
    /// Minimum number of jobs before parallelism is used.
    pub min_jobs_for_parallel: usize,
}

impl ParallelOptions {
    pub fn should_parallelize(&self, job_count: usize) -> bool {
        self.enabled && job_count >= self.min_jobs_for_parallel
    }
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "parallel"),
            min_jobs_for_parallel: 2,
        }
    }
}

/// Run independent jobs over shared read-only frames. Results keep the job
/// order.
pub fn run_tracks(
    frames: &[ImageU8<'_>],
    jobs: &[TrackJob],
    config: &TrackerConfig,
    cancel: &CancelFlag,
    parallel: ParallelOptions,
) -> Vec<Result<TrackReport, TrackFailure>> {
    let driver = SequenceDriver::new(config.clone());
    let run_job = |job: &TrackJob| {
        driver.run(
            &mut SliceSource::new(frames),
            job.seed.clone(),
            job.start_frame,
            job.frame_count,
            cancel,
        )
    };

    if parallel.should_parallelize(jobs.len()) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            return jobs.par_iter().map(&run_job).collect();
        }
    }
    jobs.iter().map(&run_job).collect()
}
