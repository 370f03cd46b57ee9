// SPDX-License-Identifier: MPL-2.0

//! Color filter layout of the reconstructed EXR mosaic.

use nalgebra::DMatrix;

/// Filter color of one composite cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfaColor {
    /// Outside of the rotated sensor area.
    Blank,
    Red,
    Green,
    Blue,
}

/// Color of each cell of a `width` x `height` composite built from
/// frames of `frame_width` x `frame_height` pixels.
///
/// The sensor area is the rotated rectangle bounded by four diagonals.
/// Inside it, even rows are green and odd rows alternate red and blue
/// every two cells.
pub fn exr_cfa_mask(
    width: usize,
    height: usize,
    frame_width: usize,
    frame_height: usize,
) -> DMatrix<CfaColor> {
    let (fw, fh) = (frame_width as i64, frame_height as i64);
    DMatrix::from_fn(height, width, |y, x| {
        let (x, y) = (x as i64, y as i64);
        let inside = x + y >= fw - 1 // NW
            && y + fw + 1 > x // NE
            && x + y < fw + 2 * fh - 1 // SE
            && x + fw > y; // SW
        if !inside {
            CfaColor::Blank
        } else if y % 2 == 0 {
            CfaColor::Green
        } else if (x + y - 1).rem_euclid(4) < 2 {
            CfaColor::Red
        } else {
            CfaColor::Blue
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::img::interleave::interleave;

    #[test]
    fn written_cells_are_inside_the_sensor_area() {
        for &(width, height) in &[(2, 2), (20, 15), (9, 4), (3, 11)] {
            let frame = Frame::from_row_slice(width, height, &vec![1u16; width * height]);
            let composite = interleave(&frame, &frame).unwrap();
            let side = composite.side();
            let mask = exr_cfa_mask(side, side, width, height);
            for (written, color) in composite.written().iter().zip(mask.iter()) {
                if *written {
                    assert_ne!(*color, CfaColor::Blank, "{}x{}", width, height);
                }
            }
        }
    }

    #[test]
    fn corners_are_blank() {
        let mask = exr_cfa_mask(35, 35, 20, 15);
        assert_eq!(mask[(0, 0)], CfaColor::Blank);
        assert_eq!(mask[(0, 34)], CfaColor::Blank);
        assert_eq!(mask[(34, 0)], CfaColor::Blank);
        assert_eq!(mask[(34, 34)], CfaColor::Blank);
    }

    #[test]
    fn row_colors() {
        let mask = exr_cfa_mask(35, 35, 20, 15);
        // Middle of the sensor area.
        assert_eq!(mask[(16, 17)], CfaColor::Green);
        // Odd row: x + y - 1 = 33, 34, 35, 36 -> 1, 2, 3, 0 (mod 4).
        assert_eq!(mask[(17, 17)], CfaColor::Red);
        assert_eq!(mask[(17, 18)], CfaColor::Blue);
        assert_eq!(mask[(17, 19)], CfaColor::Blue);
        assert_eq!(mask[(17, 20)], CfaColor::Red);
    }
}
