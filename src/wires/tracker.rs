use super::arbiter::decide_switchover;
use super::detector::detect_pair;
use super::set::WireSet;
use super::slot::WireSlot;
use crate::config::TrackerMethod;
use crate::error::TrackError;
use crate::image::{ImageU8, ImageView};
use crate::sequence::{FrameTracker, WireSeries};
use crate::template::{ResetCause, TemplateParams};
use crate::types::{Seed, Termination};
use log::{debug, info, warn};

/// Template tracker over the full wire set of one seed.
///
/// Templates and counters persist across frames; the primary position is
/// re-seeded at every frame start. Duplicates are searched on every
/// `detector_period`-th column and the switchover runs at frame end.
#[derive(Clone, Debug)]
pub struct TemplateTracker {
    wire_id: String,
    params: TemplateParams,
    wires: WireSet,
    termination: Termination,
}

impl TemplateTracker {
    pub fn new(seed: &Seed, params: TemplateParams) -> Self {
        let wires = WireSet::new(seed.y_upper, seed.y_lower, &params);
        Self {
            wire_id: seed.wire_id.clone(),
            params,
            wires,
            termination: Termination::None,
        }
    }

    pub fn wires(&self) -> &WireSet {
        &self.wires
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn begin_frame(&mut self, seed: &Seed) {
        self.wire_id = seed.wire_id.clone();
        for slot in WireSlot::ALL {
            self.wires.track_mut(slot).take_samples();
        }
        self.wires
            .track_mut(WireSlot::Primary)
            .set_positions(seed.y_upper, seed.y_lower);
    }

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

        for slot in WireSlot::ALL {
            let track = self.wires.track_mut(slot);
            let Err(out) = track.step(img, column, &self.params) else {
                continue;
            };
            if slot == WireSlot::Primary {
                warn!(
                    "TemplateTracker::step wire={} column={} {:?} window at row {} left the frame",
                    self.wire_id, column, out.edge, out.row
                );
                self.termination = Termination::OutOfSight;
                return Ok(self.termination);
            }
            debug!(
                "TemplateTracker::step wire={} column={} {} window left the frame",
                self.wire_id,
                column,
                slot.label()
            );
            track.reset(ResetCause::OutOfFrame);
            track.push_absent(column);
        }

        self.wires.reset_lost(column, &self.params);

        let period = self.params.detector_period.max(1);
        if column % period == 0 {
            self.detect_duplicates(img, column);
        }
        Ok(self.termination)
    }

    fn detect_duplicates<I: ImageView<Pixel = u8>>(&mut self, img: &I, column: usize) {
        for slot in WireSlot::SECONDARY {
            if self.wires.track(slot).in_frame() {
                continue;
            }
            let band = match slot {
                WireSlot::Splice => self.params.splice_band,
                _ => self.params.air_gap_band,
            };
            let exclude = self.wires.occupied_rows(slot);
            let primary = self.wires.track(WireSlot::Primary);
            let Some(found) = detect_pair(img, column, primary, band, &exclude, &self.params)
            else {
                continue;
            };
            let slope_dir = primary.slope_dir();
            info!(
                "TemplateTracker::step wire={} column={} {} duplicate at rows {:?} (score {:.1})",
                self.wire_id,
                column,
                slot.label(),
                found.rows,
                found.score
            );
            self.wires
                .track_mut(slot)
                .activate(found.rows, found.profiles, slope_dir, &self.params);
        }
    }

    /// Run the switchover for the finished frame.
    pub fn end_frame(&mut self) -> Termination {
        if self.termination.is_terminal() {
            return self.termination;
        }
        let actions = decide_switchover(&self.wires);
        if !actions.is_empty() {
            debug!(
                "TemplateTracker::end_frame wire={} actions={:?}",
                self.wire_id, actions
            );
        }
        let outcome = self.wires.apply(&actions);
        if outcome.is_terminal() {
            warn!(
                "TemplateTracker::end_frame wire={} {}",
                self.wire_id,
                outcome.describe()
            );
            self.termination = outcome;
        }
        self.termination
    }

    /// Per-slot series of the frame; duplicates that were never in frame are
    /// left out.
    pub fn take_series(&mut self) -> Vec<WireSeries> {
        let mut out = Vec::new();
        for slot in WireSlot::ALL {
            let samples = self.wires.track_mut(slot).take_samples();
            if slot != WireSlot::Primary && samples.iter().all(|s| !s.in_frame) {
                continue;
            }
            let wire_id = match slot {
                WireSlot::Primary => self.wire_id.clone(),
                _ => format!("{}/{}", self.wire_id, slot.label()),
            };
            out.push(WireSeries::new(wire_id, slot, samples));
        }
        out
    }
}

impl FrameTracker for TemplateTracker {
    fn method(&self) -> TrackerMethod {
        TrackerMethod::Template
    }

    fn begin_frame(&mut self, seed: &Seed) {
        TemplateTracker::begin_frame(self, seed);
    }

    fn step(&mut self, frame: &ImageU8<'_>, column: usize) -> Result<Termination, TrackError> {
        TemplateTracker::step(self, frame, column)
    }

    fn end_frame(&mut self) -> Termination {
        TemplateTracker::end_frame(self)
    }

    fn take_series(&mut self) -> Vec<WireSeries> {
        TemplateTracker::take_series(self)
    }

    fn next_seed(&self, previous: &Seed) -> Seed {
        let [upper, lower] = self.wires.track(WireSlot::Primary).positions();
        previous.continuation(upper, lower)
    }
}
