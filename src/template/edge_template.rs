use crate::measure::sad;
use std::collections::VecDeque;

/// Rolling intensity template of one edge: the element-wise mean of the last
/// `depth` accepted profiles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeTemplate {
    depth: usize,
    profiles: VecDeque<Vec<f64>>,
    mean: Vec<f64>,
}

impl EdgeTemplate {
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            profiles: VecDeque::new(),
            mean: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Current template, `None` before the first profile.
    pub fn mean(&self) -> Option<&[f64]> {
        if self.profiles.is_empty() {
            None
        } else {
            Some(&self.mean)
        }
    }

    /// Add an accepted profile, dropping the oldest beyond `depth`.
    /// Profiles of a different length than the current ones are ignored.
    pub fn push(&mut self, profile: Vec<f64>) {
        if let Some(first) = self.profiles.front() {
            if first.len() != profile.len() {
                return;
            }
        }
        self.profiles.push_back(profile);
        while self.profiles.len() > self.depth {
            self.profiles.pop_front();
        }
        self.refresh();
    }

    pub fn clear(&mut self) {
        self.profiles.clear();
        self.mean.clear();
    }

    fn refresh(&mut self) {
        let n = self.profiles.len() as f64;
        let len = self.profiles.front().map_or(0, Vec::len);
        self.mean = (0..len)
            .map(|i| self.profiles.iter().map(|p| p[i]).sum::<f64>() / n)
            .collect();
    }

    /// SAD of `profile` against the template.
    pub fn score(&self, profile: &[f64]) -> Option<f64> {
        let mean = self.mean()?;
        (mean.len() == profile.len()).then(|| sad(profile, mean))
    }

    /// Offset (rows) of the template's transition from its centre.
    ///
    /// The transition is the steepest signed central difference in
    /// `direction` (+1 rising downwards, -1 falling); the local extrema on
    /// either side of it bracket the edge, so its index is their midpoint.
    /// Ties keep the first index.
    pub fn center_offset(&self, direction: f64) -> Option<i64> {
        let mean = self.mean()?;
        if mean.len() < 3 {
            return None;
        }
        let mut best: Option<(usize, f64)> = None;
        for i in 1..mean.len() - 1 {
            let g = direction * 0.5 * (mean[i + 1] - mean[i - 1]);
            if best.map_or(true, |(_, b)| g > b) {
                best = Some((i, g));
            }
        }
        let (idx, g) = best?;
        if g <= 0.0 {
            return None;
        }
        Some(idx as i64 - (mean.len() / 2) as i64)
    }
}

/// Result of a template search around an expected row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemplateMatch {
    pub row: i64,
    pub offset: i64,
    pub score: f64,
}

/// Offsets ordered by magnitude, negative first: `0, -1, 1, -2, 2, ...`.
pub fn search_offsets(radius: usize) -> impl Iterator<Item = i64> {
    let r = radius as i64;
    std::iter::once(0).chain((1..=r).flat_map(|k| [-k, k]))
}

/// Best match of `template` over `expected + search_offsets(radius)`.
///
/// `profile_at(row)` returns the profile centred on `row`, or `None` when it
/// leaves the frame; any such row aborts the search with `Err(row)`. Ties
/// keep the smaller |offset|.
pub fn best_match<F>(
    template: &EdgeTemplate,
    expected: i64,
    radius: usize,
    mut profile_at: F,
) -> Result<Option<TemplateMatch>, i64>
where
    F: FnMut(i64) -> Option<Vec<f64>>,
{
    let mut best: Option<TemplateMatch> = None;
    for offset in search_offsets(radius) {
        let row = expected.saturating_add(offset);
        let profile = profile_at(row).ok_or(row)?;
        let Some(score) = template.score(&profile) else {
            return Ok(None);
        };
        if best.map_or(true, |b| score < b.score) {
            best = Some(TemplateMatch { row, offset, score });
        }
    }
    Ok(best)
}
