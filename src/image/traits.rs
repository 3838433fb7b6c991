use std::ops::Range;

/// Read access to a row-major single-channel image.
///
/// Column extraction only needs random row access, so anything that can hand
/// out a row slice (borrowed views, owned buffers, padded sub-views) can be
/// measured.
pub trait ImageView {
    type Pixel: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn stride(&self) -> usize;

    fn row(&self, y: usize) -> &[Self::Pixel];

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> Self::Pixel {
        self.row(y)[x]
    }

    /// Gather the 1-pixel-wide vertical slice `rows` at column `x`.
    fn column_slice(&self, x: usize, rows: Range<usize>) -> Vec<Self::Pixel> {
        rows.map(|y| self.pixel(x, y)).collect()
    }
}
