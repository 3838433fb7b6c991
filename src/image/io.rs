//! Frame decoding and report output.
//!
//! The tracking core never touches the filesystem; these helpers back
//! [`FileSource`](crate::sequence::FileSource) and the `wire_track` tool.
use super::ImageU8;
use crate::error::TrackError;
use image::ImageReader;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Owned 8-bit grayscale frame, rows packed without padding.
#[derive(Clone, Debug)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    /// Take ownership of `width * height` luma bytes.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, TrackError> {
        let frame = Self {
            width,
            height,
            data,
        };
        frame.as_view().validate()?;
        Ok(frame)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.width,
            data: &self.data,
        }
    }
}

/// Decode a frame from disk and reduce it to luma.
///
/// The format is sniffed from the file content, so camera dumps with
/// non-standard extensions still load.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8, String> {
    let luma = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .decode()
        .map_err(|e| format!("Failed to decode {}: {e}", path.display()))?
        .into_luma8();
    let (width, height) = (luma.width() as usize, luma.height() as usize);
    GrayImageU8::from_raw(width, height, luma.into_raw())
        .map_err(|e| format!("Invalid frame {}: {e}", path.display()))
}

/// Write `value` as pretty JSON to `path`, creating missing parent
/// directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
    }
    let file =
        File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    writer
        .flush()
        .map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}
