use super::stats::interior_gradient;
use crate::config::Thresholds;
use crate::image::ImageView;
use crate::types::EdgeId;
use serde::Serialize;

/// Observations accepted unconditionally before the validity policy applies.
pub const WARM_UP_OBSERVATIONS: usize = 2;

/// Row interval `[start, end)` scanned for one edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchBox {
    pub start: usize,
    pub end: usize,
}

impl SearchBox {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// The search box for `edge` left the valid row range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutOfSight {
    pub edge: EdgeId,
    pub column: usize,
    pub start: i64,
    pub end: i64,
}

/// Build the search box for `edge`, bounded by the previous watershed on the
/// inner side and by the previous edge row plus `box_width` on the outer side.
pub fn search_box(
    edge: EdgeId,
    expectation: i64,
    watershed: i64,
    box_width: i64,
    height: usize,
) -> Result<SearchBox, (i64, i64)> {
    let (start, end) = match edge {
        EdgeId::Upper => (
            expectation.saturating_sub(box_width),
            watershed.saturating_add(1),
        ),
        EdgeId::Lower => (
            watershed.saturating_add(1),
            expectation.saturating_add(box_width).saturating_add(1),
        ),
    };
    let (lo, hi) = if start > end { (end, start) } else { (start, end) };
    if lo < 0 || hi > height as i64 {
        return Err((start, end));
    }
    Ok(SearchBox {
        start: lo as usize,
        end: hi as usize,
    })
}

/// Strongest transition inside a search box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCandidate {
    /// Row of the strongest gradient.
    pub row: usize,
    /// Gradient at `row` (signed for the upper edge, magnitude for the lower).
    pub sharpness: f64,
    /// Brightness of the neighbouring pixel on the strip side.
    pub brightness: f64,
}

/// Scan a 1-pixel-wide slice and return the row with the strongest gradient.
///
/// The upper edge looks for the largest signed rise (dark sky above a bright
/// strip), the lower edge for the largest magnitude. Ties keep the topmost
/// row. Boxes shorter than three rows carry no interior gradient.
pub fn strongest_transition<I: ImageView<Pixel = u8>>(
    img: &I,
    column: usize,
    edge: EdgeId,
    sbox: SearchBox,
) -> Option<EdgeCandidate> {
    let slice = img.column_slice(column, sbox.start..sbox.end);
    let grad = interior_gradient(&slice);
    let mut best: Option<(usize, f64)> = None;
    for (k, &g) in grad.iter().enumerate() {
        let score = match edge {
            EdgeId::Upper => g,
            EdgeId::Lower => g.abs(),
        };
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((k + 1, score));
        }
    }
    let (idx, sharpness) = best?;
    let inside = match edge {
        EdgeId::Upper => idx + 1,
        EdgeId::Lower => idx - 1,
    };
    Some(EdgeCandidate {
        row: sbox.start + idx,
        sharpness,
        brightness: f64::from(slice[inside]),
    })
}

/// Remembered strip brightness per edge, used by the brightness-jump check.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BrightnessMemory {
    last: [f64; 2],
}

impl BrightnessMemory {
    pub fn get(&self, edge: EdgeId) -> f64 {
        self.last[edge.index()]
    }

    /// Blend an accepted sample into the memory (50/50 smoothing).
    pub fn accept(&mut self, edge: EdgeId, current: f64) {
        let slot = &mut self.last[edge.index()];
        *slot = 0.5 * current + 0.5 * *slot;
    }
}

/// Raw reading of one edge at one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeReading {
    pub edge: EdgeId,
    pub candidate: EdgeCandidate,
    pub missing: bool,
}

/// Column measurement extractor shared by the trackers.
#[derive(Clone, Copy, Debug)]
pub struct ColumnExtractor {
    pub box_width: usize,
}

impl ColumnExtractor {
    pub fn new(box_width: usize) -> Self {
        Self { box_width }
    }

    /// Read `edge` at `column` given the previous state `[upper, lower]`.
    ///
    /// `observations` is the number of columns the track has already
    /// processed; readings are accepted unconditionally during warm-up.
    #[allow(clippy::too_many_arguments)]
    pub fn read<I: ImageView<Pixel = u8>>(
        &self,
        img: &I,
        column: usize,
        edge: EdgeId,
        state: [f64; 2],
        memory: &mut BrightnessMemory,
        observations: usize,
        thresholds: &Thresholds,
    ) -> Result<EdgeReading, OutOfSight> {
        let expectation = state[edge.index()].round_ties_even();
        let watershed = (0.5 * state[0] + 0.5 * state[1]).round_ties_even();
        let sbox = search_box(
            edge,
            expectation as i64,
            watershed as i64,
            self.box_width as i64,
            img.height(),
        )
        .map_err(|(start, end)| OutOfSight {
            edge,
            column,
            start,
            end,
        })?;

        let last_brightness = memory.get(edge);
        let Some(candidate) = strongest_transition(img, column, edge, sbox) else {
            return Ok(EdgeReading {
                edge,
                candidate: EdgeCandidate {
                    row: expectation.max(0.0) as usize,
                    sharpness: 0.0,
                    brightness: last_brightness,
                },
                missing: true,
            });
        };

        let missing = observations > WARM_UP_OBSERVATIONS
            && ((candidate.row as f64 - expectation).abs() > thresholds.missing_threshold
                || candidate.sharpness.abs() < thresholds.sharpness_threshold
                || (last_brightness - candidate.brightness).abs()
                    > thresholds.brightness_diff_threshold);
        if !missing {
            memory.accept(edge, candidate.brightness);
        }
        Ok(EdgeReading {
            edge,
            candidate,
            missing,
        })
    }
}
