// SPDX-License-Identifier: MPL-2.0

//! Single-channel sensor frames and their loading from disk.

use image::codecs::pnm::PnmDecoder;
use image::{ColorType, ImageError, ImageFormat};
use nalgebra::DMatrix;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::interop::{gray16_matrix, unstretch};

/// One grayscale exposure, 16 bits per sample.
///
/// The matrix has one row per image row (rows = height, cols = width).
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: DMatrix<u16>,
}

impl Frame {
    pub fn new(pixels: DMatrix<u16>) -> Self {
        Self { pixels }
    }

    /// Build a frame from row-major samples.
    ///
    /// Panics if `data.len() != width * height`.
    pub fn from_row_slice(width: usize, height: usize, data: &[u16]) -> Self {
        Self::new(DMatrix::from_row_slice(height, width, data))
    }

    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn pixels(&self) -> &DMatrix<u16> {
        &self.pixels
    }

    /// Read a grayscale image file (8 or 16 bits per sample).
    ///
    /// PNM samples are returned as stored in the file, whatever its maxval.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |source: ImageError| Error::FrameLoad {
            path: path.to_path_buf(),
            source,
        };
        let max_sample = match ImageFormat::from_path(path) {
            Ok(ImageFormat::Pnm) => {
                let file = File::open(path).map_err(|e| load_error(ImageError::IoError(e)))?;
                let decoder = PnmDecoder::new(BufReader::new(file)).map_err(load_error)?;
                let (_, header) = decoder.into_inner();
                Some(header.maximal_sample())
            }
            _ => None,
        };
        let dyn_img = image::open(path).map_err(load_error)?;
        let color = dyn_img.color();
        let mut pixels = gray16_matrix(dyn_img).ok_or_else(|| {
            load_error(ImageError::Unsupported(
                image::error::UnsupportedError::from_format_and_kind(
                    image::error::ImageFormatHint::Unknown,
                    image::error::UnsupportedErrorKind::Color(color.into()),
                ),
            ))
        })?;
        if let Some(max_sample) = max_sample {
            let full_range = if color == ColorType::L8 { 255 } else { 65535 };
            unstretch(&mut pixels, max_sample, full_range);
        }
        log::debug!(
            "Loaded {} ({}x{}, {:?}, maxval {:?})",
            path.display(),
            pixels.ncols(),
            pixels.nrows(),
            color,
            max_sample
        );
        Ok(Self::new(pixels))
    }
}
