// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Diagonal interleaving of the two half frames of an EXR capture.
//!
//! Both frames are rotated 45° and merged into a square composite of side
//! `width + height`. The pixel at row `r` and column `c` of frame `n`
//! (n = 0 or 1) lands at
//!
//! ```text
//! x = c + r + n
//! y = (width - 1 - c) + r
//! ```
//!
//! Frame 1 is shifted one pixel to the right of frame 0.
//! Cells of frame 0 have `x + y = width - 1 + 2r` and cells of frame 1
//! have `x + y = width + 2r`, so the two sweeps never hit the same cell.

use image::{ImageBuffer, Luma};
use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::interop::image_from_matrix;

/// Square grid holding both frames after interleaving.
#[derive(Debug, Clone)]
pub struct Composite {
    pixels: DMatrix<u16>,
    written: DMatrix<bool>,
}

impl Composite {
    /// Zero-filled composite of the given side.
    pub fn zeros(side: usize) -> Self {
        Self {
            pixels: DMatrix::zeros(side, side),
            written: DMatrix::from_element(side, side, false),
        }
    }

    pub fn side(&self) -> usize {
        self.pixels.nrows()
    }

    pub fn pixels(&self) -> &DMatrix<u16> {
        &self.pixels
    }

    /// Cells that received a frame sample.
    pub fn written(&self) -> &DMatrix<bool> {
        &self.written
    }

    pub fn written_count(&self) -> usize {
        self.written.iter().filter(|&&w| w).count()
    }

    /// Flat row-major copy of the cells, of length `side²`.
    pub fn to_row_major(&self) -> Vec<u16> {
        self.pixels.transpose().as_slice().to_vec()
    }

    pub fn to_image(&self) -> ImageBuffer<Luma<u16>, Vec<u16>> {
        image_from_matrix(&self.pixels)
    }

    fn write(&mut self, x: usize, y: usize, value: u16) {
        debug_assert!(
            !self.written[(y, x)] || self.pixels[(y, x)] == value,
            "cell ({}, {}) written twice with different values",
            x,
            y
        );
        self.pixels[(y, x)] = value;
        self.written[(y, x)] = true;
    }

    /// Write one frame with the given horizontal shift (0 or 1).
    fn write_frame(&mut self, frame: &Frame, shift: usize) {
        let (width, height) = frame.dimensions();
        for row in 0..height {
            for col in 0..width {
                let (x, y) = diagonal_position(width, row, col, shift);
                self.write(x, y, frame.pixels()[(row, col)]);
            }
        }
    }
}

/// Composite (x, y) of the sample at (row, col) of a frame `width` pixels wide.
///
/// `col` must be lower than `width`.
pub fn diagonal_position(width: usize, row: usize, col: usize, shift: usize) -> (usize, usize) {
    (col + row + shift, width - 1 - col + row)
}

/// Merge two frames of identical dimensions into their diagonal composite.
///
/// Dimensions are checked before anything is allocated.
pub fn interleave(frame0: &Frame, frame1: &Frame) -> Result<Composite> {
    let (width, height) = frame0.dimensions();
    if frame1.dimensions() != (width, height) {
        return Err(Error::DimensionMismatch {
            first: (width, height),
            second: frame1.dimensions(),
        });
    }
    let mut composite = Composite::zeros(width + height);
    for (shift, frame) in [frame0, frame1].iter().enumerate() {
        composite.write_frame(frame, shift);
        log::info!("Wrote frame {}", shift);
    }
    log::debug!(
        "{} of {} composite cells written",
        composite.written_count(),
        composite.side() * composite.side()
    );
    Ok(composite)
}

/// Extract both frames back from a composite built for `width` x `height` frames.
pub fn deinterleave(composite: &Composite, width: usize, height: usize) -> Result<(Frame, Frame)> {
    if composite.side() != width + height {
        return Err(Error::CompositeSizeMismatch {
            expected: width + height,
            got: composite.side(),
        });
    }
    let extract = |shift| {
        Frame::new(DMatrix::from_fn(height, width, |row, col| {
            let (x, y) = diagonal_position(width, row, col, shift);
            composite.pixels[(y, x)]
        }))
    };
    Ok((extract(0), extract(1)))
}
