use super::edge_template::{best_match, EdgeTemplate};
use super::errors::{ColumnFlags, ErrorCounters, ResetCause};
use super::params::TemplateParams;
use crate::image::ImageView;
use crate::measure::{brightness_stats, column_profile, mean_std};
use crate::types::{BrightnessStats, ColumnSample, EdgeId, MatchDiagnostics};
use log::debug;
use std::collections::VecDeque;

/// A profile window of `edge` left the frame at `column`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowOutOfFrame {
    pub edge: EdgeId,
    pub column: usize,
    pub row: i64,
}

/// Template-matching state of one wire.
///
/// An inactive track (`in_frame == false`) holds no template and records
/// placeholder samples. The first step of an active track without templates
/// seeds them from the current positions.
#[derive(Clone, Debug)]
pub struct TemplateTrack {
    templates: [EdgeTemplate; 2],
    positions: [f64; 2],
    history: [VecDeque<f64>; 2],
    slope_dir: i8,
    counters: ErrorCounters,
    flags: ColumnFlags,
    in_frame: bool,
    last_reset: Option<ResetCause>,
    samples: Vec<ColumnSample>,
}

impl TemplateTrack {
    /// Inactive slot.
    pub fn inactive(params: &TemplateParams) -> Self {
        Self {
            templates: [
                EdgeTemplate::new(params.template_depth),
                EdgeTemplate::new(params.template_depth),
            ],
            positions: [f64::NAN, f64::NAN],
            history: [VecDeque::new(), VecDeque::new()],
            slope_dir: 1,
            counters: ErrorCounters::default(),
            flags: ColumnFlags::default(),
            in_frame: false,
            last_reset: None,
            samples: Vec::new(),
        }
    }

    /// Active track at the given edge rows; templates are seeded on the
    /// first step.
    pub fn start(upper: f64, lower: f64, params: &TemplateParams) -> Self {
        let mut track = Self::inactive(params);
        track.positions = [upper, lower];
        track.in_frame = true;
        track
    }

    /// Bring an inactive slot in frame with templates taken from the matched
    /// profiles.
    pub fn activate(
        &mut self,
        rows: [f64; 2],
        profiles: [Vec<f64>; 2],
        slope_dir: i8,
        params: &TemplateParams,
    ) {
        for (template, profile) in self.templates.iter_mut().zip(profiles) {
            template.clear();
            template.push(profile);
        }
        self.positions = rows;
        for (h, &p) in self.history.iter_mut().zip(rows.iter()) {
            h.clear();
            push_capped(h, p, params.trend_window);
        }
        self.slope_dir = slope_dir;
        self.in_frame = true;
    }

    /// Move the track to a new seed, keeping templates and counters.
    pub fn set_positions(&mut self, upper: f64, lower: f64) {
        self.positions = [upper, lower];
    }

    /// Clear templates, trend and counters and take the wire out of frame.
    pub fn reset(&mut self, cause: ResetCause) {
        for t in &mut self.templates {
            t.clear();
        }
        for h in &mut self.history {
            h.clear();
        }
        self.counters = ErrorCounters::default();
        self.flags = ColumnFlags::default();
        self.in_frame = false;
        self.last_reset = Some(cause);
    }

    /// Take over templates, trend, orientation and in-frame status.
    pub fn adopt(&mut self, other: &TemplateTrack) {
        self.templates = other.templates.clone();
        self.history = other.history.clone();
        self.positions = other.positions;
        self.slope_dir = other.slope_dir;
        self.in_frame = other.in_frame;
    }

    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    pub fn has_template(&self) -> bool {
        self.templates.iter().all(|t| !t.is_empty())
    }

    pub fn template(&self, edge: EdgeId) -> &EdgeTemplate {
        &self.templates[edge.index()]
    }

    pub fn positions(&self) -> [f64; 2] {
        self.positions
    }

    pub fn slope_dir(&self) -> i8 {
        self.slope_dir
    }

    pub fn counters(&self) -> &ErrorCounters {
        &self.counters
    }

    pub fn flags(&self) -> &ColumnFlags {
        &self.flags
    }

    pub fn last_reset(&self) -> Option<ResetCause> {
        self.last_reset
    }

    pub fn samples(&self) -> &[ColumnSample] {
        &self.samples
    }

    /// Record `column` as not observed by this wire.
    pub fn push_absent(&mut self, column: usize) {
        self.samples.push(ColumnSample::absent(column));
    }

    pub fn take_samples(&mut self) -> Vec<ColumnSample> {
        std::mem::take(&mut self.samples)
    }

    /// Wire-loss condition reached by an active track.
    pub fn loss_cause(&self, params: &TemplateParams) -> Option<ResetCause> {
        if self.in_frame {
            self.counters.loss_cause(params)
        } else {
            None
        }
    }

    /// Process one column.
    pub fn step<I: ImageView<Pixel = u8>>(
        &mut self,
        img: &I,
        column: usize,
        params: &TemplateParams,
    ) -> Result<(), WindowOutOfFrame> {
        self.flags = ColumnFlags::default();
        if !self.in_frame {
            self.push_absent(column);
            return Ok(());
        }
        if !self.has_template() {
            return self.seed_templates(img, column, params);
        }

        let mut accepted = self.positions;
        let mut rejected = [false; 2];
        let mut gradients = [0.0; 2];
        let mut scores = [None; 2];
        let mut stds = [f64::NAN; 2];
        for edge in EdgeId::BOTH {
            let i = edge.index();
            let prev = self.positions[i];
            let expected = prev.round_ties_even() as i64;
            let here = edge_profile(img, column, expected, params).ok_or(WindowOutOfFrame {
                edge,
                column,
                row: expected,
            })?;
            let found = best_match(&self.templates[i], expected, params.search_radius, |row| {
                edge_profile(img, column, row, params)
            })
            .map_err(|row| WindowOutOfFrame { edge, column, row })?;

            let flags = &mut self.flags.edges[i];
            stds[i] = mean_std(&here).1;
            flags.no_edge = stds[i] < params.flatness_floor;
            match found {
                Some(m) => {
                    scores[i] = Some(m.score);
                    flags.skip = (m.row as f64 - prev).abs() >= params.skip_limit;
                    flags.diff = m.score > params.diff_ceiling;
                    accepted[i] = m.row as f64;
                }
                None => flags.diff = true,
            }
            if flags.rejected() {
                rejected[i] = true;
                accepted[i] = trend(&self.history[i]).unwrap_or(prev);
            }
            gradients[i] = signed_gradient(img, column, accepted[i].round_ties_even() as i64);
        }

        if self.flags.edges.iter().all(|f| f.no_edge) {
            self.flags.missing = true;
            self.counters.record(&self.flags);
            self.samples.push(ColumnSample {
                matching: Some(MatchDiagnostics {
                    score: scores,
                    edge_std: stds,
                    errors: self.flags.error_log(),
                }),
                in_frame: true,
                ..ColumnSample::absent(column)
            });
            return Ok(());
        }

        let dir = f64::from(self.slope_dir);
        if gradients[0] * dir < 0.0 && gradients[1] * dir > 0.0 {
            self.slope_dir = -self.slope_dir;
            debug!(
                "TemplateTrack::step column={} orientation flipped to {}",
                column, self.slope_dir
            );
        }
        let dir = f64::from(self.slope_dir);
        for edge in EdgeId::BOTH {
            let i = edge.index();
            if rejected[i] {
                continue;
            }
            let direction = match edge {
                EdgeId::Upper => dir,
                EdgeId::Lower => -dir,
            };
            if let Some(offset) = self.templates[i].center_offset(direction) {
                accepted[i] += offset as f64;
            }
        }

        for i in 0..2 {
            let prev = self.positions[i];
            accepted[i] = prev + (accepted[i] - prev).clamp(-1.0, 1.0);
        }

        let [avg_upper, avg_lower] = self.rolling_average();
        let center = 0.5 * (avg_upper + avg_lower);
        if !(accepted[0] < center && accepted[1] > center) {
            accepted = [avg_upper, avg_lower];
        }

        let matched = MatchStats {
            score: scores,
            edge_std: stds,
        };
        self.commit(img, column, accepted, rejected, matched, params);
        Ok(())
    }

    fn seed_templates<I: ImageView<Pixel = u8>>(
        &mut self,
        img: &I,
        column: usize,
        params: &TemplateParams,
    ) -> Result<(), WindowOutOfFrame> {
        let mut profiles = Vec::with_capacity(2);
        let mut stds = [f64::NAN; 2];
        for edge in EdgeId::BOTH {
            let row = self.positions[edge.index()].round_ties_even() as i64;
            let profile = edge_profile(img, column, row, params).ok_or(WindowOutOfFrame {
                edge,
                column,
                row,
            })?;
            stds[edge.index()] = mean_std(&profile).1;
            profiles.push(profile);
        }
        let upper_row = self.positions[0].round_ties_even() as i64;
        self.slope_dir = if signed_gradient(img, column, upper_row) >= 0.0 {
            1
        } else {
            -1
        };
        for (template, profile) in self.templates.iter_mut().zip(profiles) {
            template.clear();
            template.push(profile);
        }
        for h in &mut self.history {
            h.clear();
        }
        // the seeding column learns nothing beyond the seeded profiles
        let matched = MatchStats {
            score: [None; 2],
            edge_std: stds,
        };
        self.commit(img, column, self.positions, [true, true], matched, params);
        Ok(())
    }

    /// Apply width checks, update counters, trend and templates, and record
    /// the column sample. Templates learn only from edges in `rejected` that
    /// are false.
    fn commit<I: ImageView<Pixel = u8>>(
        &mut self,
        img: &I,
        column: usize,
        accepted: [f64; 2],
        rejected: [bool; 2],
        matched: MatchStats,
        params: &TemplateParams,
    ) {
        let width = accepted[1] - accepted[0];
        self.flags.width_small = width < params.min_width;
        self.flags.width_large = width > params.max_width;
        self.counters.record(&self.flags);

        self.positions = accepted;
        for i in 0..2 {
            push_capped(&mut self.history[i], accepted[i], params.trend_window);
            if rejected[i] {
                continue;
            }
            let row = accepted[i].round_ties_even() as i64;
            if let Some(profile) = edge_profile(img, column, row, params) {
                self.templates[i].push(profile);
            }
        }

        let upper = accepted[0].round_ties_even() as i64;
        let lower = accepted[1].round_ties_even() as i64;
        let center = (0.5 * (accepted[0] + accepted[1])).round_ties_even() as i64;
        let brightness = if accepted.iter().all(|v| v.is_finite()) {
            brightness_stats(img, column, upper, lower, center)
        } else {
            BrightnessStats::MISSING
        };
        self.samples.push(ColumnSample {
            column,
            upper_edge: accepted[0],
            lower_edge: accepted[1],
            width,
            slope: None,
            variances: None,
            brightness,
            measured: None,
            missing: [self.flags.edges[0].rejected(), self.flags.edges[1].rejected()],
            matching: Some(MatchDiagnostics {
                score: matched.score,
                edge_std: matched.edge_std,
                errors: self.flags.error_log(),
            }),
            in_frame: true,
        });
    }

    fn rolling_average(&self) -> [f64; 2] {
        let mut out = self.positions;
        for (o, h) in out.iter_mut().zip(self.history.iter()) {
            if !h.is_empty() {
                *o = h.iter().sum::<f64>() / h.len() as f64;
            }
        }
        out
    }
}

/// Match results carried from the search into the column sample.
#[derive(Clone, Copy, Debug)]
struct MatchStats {
    score: [Option<f64>; 2],
    edge_std: [f64; 2],
}

/// Profile centred on `row`.
pub fn edge_profile<I: ImageView<Pixel = u8>>(
    img: &I,
    x: usize,
    row: i64,
    params: &TemplateParams,
) -> Option<Vec<f64>> {
    column_profile(
        img,
        x,
        row.saturating_sub(params.half_window as i64),
        params.profile_len(),
    )
}

/// Mean of the recent positions extrapolated one column forward by their
/// mean step.
pub fn trend(history: &VecDeque<f64>) -> Option<f64> {
    let n = history.len();
    let first = *history.front()?;
    let last = *history.back()?;
    let mean = history.iter().sum::<f64>() / n as f64;
    let step = if n > 1 {
        (last - first) / (n - 1) as f64
    } else {
        0.0
    };
    Some(mean + step * (n + 1) as f64 / 2.0)
}

fn signed_gradient<I: ImageView<Pixel = u8>>(img: &I, x: usize, row: i64) -> f64 {
    let Ok(row) = usize::try_from(row) else {
        return 0.0;
    };
    if row < 1 || row >= img.height().saturating_sub(1) {
        return 0.0;
    }
    0.5 * (f64::from(img.pixel(x, row + 1)) - f64::from(img.pixel(x, row - 1)))
}

fn push_capped(history: &mut VecDeque<f64>, value: f64, cap: usize) {
    history.push_back(value);
    while history.len() > cap.max(1) {
        history.pop_front();
    }
}
