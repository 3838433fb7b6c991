//! Small numeric helpers over 1-pixel-wide column slices.
use crate::image::ImageView;
use crate::types::BrightnessStats;

/// Population mean and standard deviation. Empty input yields `NaN`s.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Sum of absolute differences between two equally sized profiles.
pub fn sad(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// Central differences `(s[i+1] - s[i-1]) / 2` on the interior samples.
///
/// Entry `k` of the result belongs to sample `k + 1`.
pub fn interior_gradient(slice: &[u8]) -> Vec<f64> {
    if slice.len() < 3 {
        return Vec::new();
    }
    slice
        .windows(3)
        .map(|w| 0.5 * (f64::from(w[2]) - f64::from(w[0])))
        .collect()
}

/// Brightness at the strip centre plus mean/std over the inclusive rows
/// `upper..=lower` of column `x`. Rows are clamped to the frame; an inverted
/// span yields `NaN` statistics.
pub fn brightness_stats<I: ImageView<Pixel = u8>>(
    img: &I,
    x: usize,
    upper: i64,
    lower: i64,
    center: i64,
) -> BrightnessStats {
    let last_row = img.height() as i64 - 1;
    if last_row < 0 || x >= img.width() {
        return BrightnessStats::MISSING;
    }
    let center = f64::from(img.pixel(x, center.clamp(0, last_row) as usize));
    let lo = upper.clamp(0, last_row);
    let hi = lower.clamp(0, last_row);
    if lo > hi {
        return BrightnessStats {
            center,
            mean: f64::NAN,
            std: f64::NAN,
        };
    }
    let values: Vec<f64> = (lo..=hi)
        .map(|y| f64::from(img.pixel(x, y as usize)))
        .collect();
    let (mean, std) = mean_std(&values);
    BrightnessStats { center, mean, std }
}

/// Read `len` samples of column `x` starting at row `top`, or `None` when the
/// window leaves the frame.
pub fn column_profile<I: ImageView<Pixel = u8>>(
    img: &I,
    x: usize,
    top: i64,
    len: usize,
) -> Option<Vec<f64>> {
    let top = usize::try_from(top).ok()?;
    let end = top.checked_add(len)?;
    if x >= img.width() || end > img.height() {
        return None;
    }
    Some(
        img.column_slice(x, top..end)
            .into_iter()
            .map(f64::from)
            .collect(),
    )
}
