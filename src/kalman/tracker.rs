use super::filter::{Correction, EdgeObservation, Observation, StateFilter};
use super::params::{KalmanParams, PartialMissPolicy};
use crate::config::{Thresholds, TrackerMethod};
use crate::error::TrackError;
use crate::image::{ImageU8, ImageView};
use crate::measure::{brightness_stats, BrightnessMemory, ColumnExtractor, EdgeReading};
use crate::sequence::{FrameTracker, WireSeries};
use crate::types::{ColumnSample, EdgeId, Seed, StateVariances, Termination};
use log::{debug, warn};
use nalgebra::Vector3;

/// Recursive edge tracker for one wire.
///
/// The filter is rebuilt from the carried seed at every [`begin_frame`]
/// call; counters and brightness memory are per frame. A termination is
/// sticky: once set, further steps return it without touching the series.
///
/// [`begin_frame`]: KalmanTracker::begin_frame
#[derive(Clone, Debug)]
pub struct KalmanTracker {
    wire_id: String,
    params: KalmanParams,
    thresholds: Thresholds,
    extractor: ColumnExtractor,
    filter: StateFilter,
    memory: BrightnessMemory,
    num_observations: usize,
    missing_count: f64,
    last_correction: Correction,
    termination: Termination,
    samples: Vec<ColumnSample>,
}

impl KalmanTracker {
    pub fn new(seed: &Seed, params: KalmanParams, thresholds: Thresholds) -> Self {
        let filter = StateFilter::new(&params, initial_state(seed));
        Self {
            wire_id: seed.wire_id.clone(),
            extractor: ColumnExtractor::new(params.box_width),
            params,
            thresholds,
            filter,
            memory: BrightnessMemory::default(),
            num_observations: 0,
            missing_count: 0.0,
            last_correction: Correction::PredictOnly,
            termination: Termination::None,
            samples: Vec::new(),
        }
    }

    /// Start a frame from `seed`: fresh filter, zeroed counters, empty series.
    pub fn begin_frame(&mut self, seed: &Seed) {
        self.wire_id = seed.wire_id.clone();
        self.filter = StateFilter::new(&self.params, initial_state(seed));
        self.memory = BrightnessMemory::default();
        self.num_observations = 0;
        self.missing_count = 0.0;
        self.last_correction = Correction::PredictOnly;
        self.samples.clear();
    }

    pub fn num_observations(&self) -> usize {
        self.num_observations
    }

    pub fn missing_count(&self) -> f64 {
        self.missing_count
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn last_correction(&self) -> Correction {
        self.last_correction
    }

    /// Posterior `[upper, lower]` after the last processed column.
    pub fn last_estimate(&self) -> [f64; 2] {
        let m = self.filter.mean();
        [m[0], m[1]]
    }

    pub fn samples(&self) -> &[ColumnSample] {
        &self.samples
    }

    pub fn take_samples(&mut self) -> Vec<ColumnSample> {
        std::mem::take(&mut self.samples)
    }

    /// Process one column. Returns the (possibly new) termination state.
    pub fn step<I: ImageView<Pixel = u8>>(
        &mut self,
        img: &I,
        column: usize,
    ) -> Result<Termination, TrackError> {
        if self.termination.is_terminal() {
            return Ok(self.termination);
        }
        if column >= img.width() {
            return Err(TrackError::SeedColumnOutOfBounds {
                x: column,
                width: img.width(),
            });
        }

        let prior = self.last_estimate();
        let mut readings = Vec::with_capacity(2);
        for edge in EdgeId::BOTH {
            match self.extractor.read(
                img,
                column,
                edge,
                prior,
                &mut self.memory,
                self.num_observations,
                &self.thresholds,
            ) {
                Ok(reading) => readings.push(reading),
                Err(oos) => {
                    warn!(
                        "KalmanTracker::step wire={} column={} {:?} box [{}, {}) left the frame",
                        self.wire_id, column, oos.edge, oos.start, oos.end
                    );
                    self.termination = Termination::OutOfSight;
                    return Ok(self.termination);
                }
            }
        }
        let (upper, lower) = (readings[0], readings[1]);

        let obs = self.finalize_measurement(&upper, &lower, prior);
        self.last_correction = self.filter.step(obs);
        let mean = *self.filter.mean();
        if !mean.iter().all(|v| v.is_finite()) {
            return Err(TrackError::NonFiniteState { column });
        }

        let upper_edge = mean[0].floor();
        let lower_edge = mean[1].ceil();
        let width = lower_edge - upper_edge + 2.0;
        let center = (0.5 * (mean[0] + mean[1])).round_ties_even();
        let brightness = brightness_stats(
            img,
            column,
            upper_edge as i64,
            lower_edge as i64,
            center as i64,
        );
        let cov = self.filter.covariance();
        self.samples.push(ColumnSample {
            column,
            upper_edge,
            lower_edge,
            width,
            slope: Some(mean[2]),
            variances: Some(StateVariances {
                upper: cov[(0, 0)],
                lower: cov[(1, 1)],
                slope: cov[(2, 2)],
            }),
            brightness,
            measured: Some([upper.candidate.row as f64, lower.candidate.row as f64]),
            missing: [upper.missing, lower.missing],
            matching: None,
            in_frame: true,
        });
        self.num_observations += 1;

        if self.missing_count > self.thresholds.missing_count_limit {
            self.termination = Termination::ExceedMissingCount;
        } else if width > self.thresholds.width_exceed_limit {
            self.termination = Termination::ExceedWidth;
        }
        if self.termination.is_terminal() {
            warn!(
                "KalmanTracker::step wire={} column={} {} (missing_count={:.2}, width={})",
                self.wire_id,
                column,
                self.termination.describe(),
                self.missing_count,
                width
            );
        }
        Ok(self.termination)
    }

    /// Turn two readings into the filter observation and update the missing
    /// count (1 per double miss, 0.25 per single miss).
    fn finalize_measurement(
        &mut self,
        upper: &EdgeReading,
        lower: &EdgeReading,
        prior: [f64; 2],
    ) -> Observation {
        let policy = self.params.partial_miss;
        let observe = |reading: &EdgeReading| {
            if reading.missing {
                match policy {
                    PartialMissPolicy::SubstituteEstimate => {
                        EdgeObservation::Observed(prior[reading.edge.index()])
                    }
                    PartialMissPolicy::ScalarUpdate => EdgeObservation::Missing,
                }
            } else {
                EdgeObservation::Observed(reading.candidate.row as f64)
            }
        };
        match (upper.missing, lower.missing) {
            (true, true) => {
                self.missing_count += 1.0;
                Observation::none()
            }
            (false, false) => Observation::both(
                upper.candidate.row as f64,
                lower.candidate.row as f64,
            ),
            _ => {
                self.missing_count += 0.25;
                Observation {
                    upper: observe(upper),
                    lower: observe(lower),
                }
            }
        }
    }
}

fn initial_state(seed: &Seed) -> Vector3<f64> {
    Vector3::new(seed.y_upper, seed.y_lower, 0.0)
}

impl FrameTracker for KalmanTracker {
    fn method(&self) -> TrackerMethod {
        TrackerMethod::Kalman
    }

    fn begin_frame(&mut self, seed: &Seed) {
        KalmanTracker::begin_frame(self, seed);
    }

    fn step(&mut self, frame: &ImageU8<'_>, column: usize) -> Result<Termination, TrackError> {
        KalmanTracker::step(self, frame, column)
    }

    fn end_frame(&mut self) -> Termination {
        debug!(
            "KalmanTracker::end_frame wire={} observations={} missing_count={:.2}",
            self.wire_id, self.num_observations, self.missing_count
        );
        self.termination
    }

    fn take_series(&mut self) -> Vec<WireSeries> {
        vec![WireSeries::primary(self.wire_id.clone(), self.take_samples())]
    }

    fn next_seed(&self, previous: &Seed) -> Seed {
        let [upper, lower] = self.last_estimate();
        previous.continuation(upper, lower)
    }
}
