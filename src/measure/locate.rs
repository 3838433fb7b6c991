//! Initial edge search from a rough strip centre.
//!
//! Operators point at the wire once, usually on the first frame of a run.
//! The upper edge is the strongest rise in the rows above the centre, the
//! lower edge the strongest transition below it.
use super::column::{strongest_transition, EdgeCandidate, SearchBox};
use crate::image::ImageView;
use crate::types::EdgeId;
use log::debug;

/// Edge rows `[upper, lower]` of the strip around `center_row` in `column`.
///
/// Each box spans `half_height` rows on its side of the centre, clipped to
/// the frame. `None` when the centre is outside the frame or either edge is
/// weaker than `min_sharpness`.
pub fn locate_edges<I: ImageView<Pixel = u8>>(
    img: &I,
    column: usize,
    center_row: f64,
    half_height: usize,
    min_sharpness: f64,
) -> Option<[usize; 2]> {
    if column >= img.width() || !center_row.is_finite() || center_row < 0.0 {
        return None;
    }
    let center = center_row.round_ties_even() as usize;
    if center >= img.height() {
        return None;
    }
    let above = SearchBox {
        start: center.saturating_sub(half_height),
        end: center + 1,
    };
    let below = SearchBox {
        start: center + 1,
        end: center.saturating_add(half_height).saturating_add(1).min(img.height()),
    };
    let sharp = |c: &EdgeCandidate| c.sharpness >= min_sharpness;
    let upper = strongest_transition(img, column, EdgeId::Upper, above).filter(sharp)?;
    let lower = strongest_transition(img, column, EdgeId::Lower, below).filter(sharp)?;
    debug!(
        "locate_edges column={} center={} rows=({}, {}) sharpness=({:.1}, {:.1})",
        column, center, upper.row, lower.row, upper.sharpness, lower.sharpness
    );
    Some([upper.row, lower.row])
}
