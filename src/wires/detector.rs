//! Search for a duplicate edge pair outside the primary wire.
//!
//! A band is a range of row gaps `[near, far)` between the primary pair and
//! the nearer edge of the candidate pair. The band above the primary is
//! scanned first, then the band below, each outwards from the primary. The
//! anchor is the nearer edge; its partner is searched outwards from the
//! anchor up to `pair_separation_max` rows. Both edges must match the
//! primary's templates under the detection ceiling. The first qualifying
//! pair in scan order wins, so a pair one row off an exact match is taken
//! as soon as the scan reaches it and the tracker's centring settles it.
use crate::image::ImageView;
use crate::template::{edge_profile, EdgeTemplate, TemplateParams, TemplateTrack};
use crate::types::EdgeId;

/// A duplicate pair found by [`detect_pair`].
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub rows: [f64; 2],
    pub profiles: [Vec<f64>; 2],
    pub score: f64,
}

impl Detection {
    fn overlaps(&self, rows: [f64; 2], margin: f64) -> bool {
        self.rows[0] <= rows[1] + margin && self.rows[1] >= rows[0] - margin
    }
}

/// Scan `band` above and below the primary at `column`.
///
/// Pairs overlapping any of `exclude` (edge rows of wires already tracked)
/// are skipped and the scan goes on.
pub fn detect_pair<I: ImageView<Pixel = u8>>(
    img: &I,
    column: usize,
    primary: &TemplateTrack,
    band: (usize, usize),
    exclude: &[[f64; 2]],
    params: &TemplateParams,
) -> Option<Detection> {
    if !primary.in_frame() || !primary.has_template() {
        return None;
    }
    let [pu, pl] = primary.positions();
    let scan = Scan {
        img,
        column,
        upper_t: primary.template(EdgeId::Upper),
        lower_t: primary.template(EdgeId::Lower),
        params,
    };
    let margin = params.half_window as f64;
    let admissible = |d: &Detection| !exclude.iter().any(|&rows| d.overlaps(rows, margin));

    let (pu, pl) = (pu.round_ties_even() as i64, pl.round_ties_even() as i64);
    (band.0..band.1)
        .filter_map(|gap| scan.pair_from_lower(pu.saturating_sub(gap as i64)))
        .find(admissible)
        .or_else(|| {
            (band.0..band.1)
                .filter_map(|gap| scan.pair_from_upper(pl.saturating_add(gap as i64)))
                .find(admissible)
        })
}

struct Scan<'a, I> {
    img: &'a I,
    column: usize,
    upper_t: &'a EdgeTemplate,
    lower_t: &'a EdgeTemplate,
    params: &'a TemplateParams,
}

impl<I: ImageView<Pixel = u8>> Scan<'_, I> {
    fn scored(&self, template: &EdgeTemplate, row: i64) -> Option<(Vec<f64>, f64)> {
        let profile = edge_profile(self.img, self.column, row, self.params)?;
        let score = template.score(&profile)?;
        (score < self.params.detection_ceiling).then_some((profile, score))
    }

    /// First partner of `anchor` matching `template`, `direction` rows per
    /// step away from it.
    fn partner(
        &self,
        template: &EdgeTemplate,
        anchor: i64,
        direction: i64,
    ) -> Option<(i64, Vec<f64>, f64)> {
        (1..=self.params.pair_separation_max as i64).find_map(|sep| {
            let row = anchor.saturating_add(direction * sep);
            self.scored(template, row).map(|(p, s)| (row, p, s))
        })
    }

    /// Anchor on a lower edge and look upwards for its upper edge.
    fn pair_from_lower(&self, r_l: i64) -> Option<Detection> {
        let (lower_p, lower_s) = self.scored(self.lower_t, r_l)?;
        let (r_u, upper_p, upper_s) = self.partner(self.upper_t, r_l, -1)?;
        Some(Detection {
            rows: [r_u as f64, r_l as f64],
            profiles: [upper_p, lower_p],
            score: upper_s + lower_s,
        })
    }

    /// Anchor on an upper edge and look downwards for its lower edge.
    fn pair_from_upper(&self, r_u: i64) -> Option<Detection> {
        let (upper_p, upper_s) = self.scored(self.upper_t, r_u)?;
        let (r_l, lower_p, lower_s) = self.partner(self.lower_t, r_u, 1)?;
        Some(Detection {
            rows: [r_u as f64, r_l as f64],
            profiles: [upper_p, lower_p],
            score: upper_s + lower_s,
        })
    }
}
