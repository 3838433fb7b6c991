//! Frame acquisition for the sequence driver.
//!
//! Acquisition is the only blocking call of a run. Sources hand out one
//! borrowed frame at a time; the driver never holds two frames at once.
use crate::error::TrackError;
use crate::image::io::load_grayscale_image;
use crate::image::{GrayImageU8, ImageU8};
use std::path::PathBuf;

pub trait FrameSource {
    fn frame_count(&self) -> usize;

    /// Borrow frame `index`.
    fn frame(&mut self, index: usize) -> Result<ImageU8<'_>, TrackError>;
}

/// Frames already in memory.
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'s, 'a> {
    frames: &'s [ImageU8<'a>],
}

impl<'s, 'a> SliceSource<'s, 'a> {
    pub fn new(frames: &'s [ImageU8<'a>]) -> Self {
        Self { frames }
    }
}

impl FrameSource for SliceSource<'_, '_> {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&mut self, index: usize) -> Result<ImageU8<'_>, TrackError> {
        self.frames
            .get(index)
            .cloned()
            .ok_or(TrackError::FrameIndexOutOfRange {
                index,
                available: self.frames.len(),
            })
    }
}

/// Image files decoded on demand; the last decoded frame is cached.
#[derive(Debug)]
pub struct FileSource {
    paths: Vec<PathBuf>,
    cached: Option<(usize, GrayImageU8)>,
}

impl FileSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            cached: None,
        }
    }
}

impl FrameSource for FileSource {
    fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn frame(&mut self, index: usize) -> Result<ImageU8<'_>, TrackError> {
        let path = self
            .paths
            .get(index)
            .ok_or(TrackError::FrameIndexOutOfRange {
                index,
                available: self.paths.len(),
            })?;
        let hit = matches!(&self.cached, Some((i, _)) if *i == index);
        if !hit {
            let gray = load_grayscale_image(path)
                .map_err(|reason| TrackError::FrameAcquisition { index, reason })?;
            self.cached = Some((index, gray));
        }
        match &self.cached {
            Some((_, gray)) => Ok(gray.as_view()),
            None => Err(TrackError::FrameAcquisition {
                index,
                reason: "frame cache is empty".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_reports_missing_index() {
        let data = vec![0u8; 4];
        let frames = [ImageU8::try_new(2, 2, 2, &data).unwrap()];
        let mut src = SliceSource::new(&frames);
        assert_eq!(src.frame_count(), 1);
        assert!(src.frame(0).is_ok());
        assert_eq!(
            src.frame(3).unwrap_err(),
            TrackError::FrameIndexOutOfRange {
                index: 3,
                available: 1
            }
        );
    }

    #[test]
    fn file_source_surfaces_decode_failure() {
        let mut src = FileSource::new(vec![PathBuf::from("/nonexistent/frame_0000.png")]);
        match src.frame(0) {
            Err(TrackError::FrameAcquisition { index, .. }) => assert_eq!(index, 0),
            other => panic!("unexpected {other:?}"),
        }
    }
}
