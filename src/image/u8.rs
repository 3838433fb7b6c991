use crate::error::TrackError;

/// Borrowed 8-bit grayscale frame. Rows are vertical pixel positions (`y`),
/// columns are horizontal positions (`x`).
#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    /// Wrap a raw buffer after checking that every row is addressable.
    pub fn try_new(w: usize, h: usize, stride: usize, data: &'a [u8]) -> Result<Self, TrackError> {
        let img = Self { w, h, stride, data };
        img.validate()?;
        Ok(img)
    }

    /// Check the view invariants. Views built with a struct literal are
    /// validated by the sequence driver before any column is read.
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.w == 0 || self.h == 0 {
            return Err(TrackError::MalformedFrame(format!(
                "empty frame {}x{}",
                self.w, self.h
            )));
        }
        if self.stride < self.w {
            return Err(TrackError::MalformedFrame(format!(
                "stride {} is smaller than width {}",
                self.stride, self.w
            )));
        }
        let required = (self.h - 1) * self.stride + self.w;
        if self.data.len() < required {
            return Err(TrackError::MalformedFrame(format!(
                "buffer holds {} bytes, {}x{} with stride {} needs {}",
                self.data.len(),
                self.w,
                self.h,
                self.stride,
                required
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }
}

impl<'a> crate::image::traits::ImageView for ImageU8<'a> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageView;

    #[test]
    fn try_new_rejects_short_buffer() {
        let data = vec![0u8; 10];
        let err = ImageU8::try_new(4, 3, 4, &data).unwrap_err();
        assert!(matches!(err, TrackError::MalformedFrame(_)));
    }

    #[test]
    fn pixels_are_addressed_by_column_and_row() {
        let data: Vec<u8> = (0..12).collect();
        let img = ImageU8::try_new(3, 4, 3, &data).unwrap();
        assert_eq!(img.get(1, 2), 7);
        assert_eq!(img.pixel(2, 3), 11);
        assert_eq!(img.column_slice(1, 0..4), vec![1, 4, 7, 10]);
    }

    #[test]
    fn padded_stride_is_accepted() {
        let data = vec![0u8; 5 * 2 + 3];
        assert!(ImageU8::try_new(3, 3, 5, &data).is_ok());
    }
}
