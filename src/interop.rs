// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interoperability conversions between the image and matrix types.

use image::{DynamicImage, ImageBuffer, Luma, Primitive, Rgb};
use nalgebra::{DMatrix, Scalar};

/// Convert a matrix into a gray level image.
/// Inverse operation of `matrix_from_image`.
///
/// This performs a transposition to accomodate for the
/// column major matrix into the row major image.
#[allow(clippy::cast_possible_truncation)]
pub fn image_from_matrix<T: Scalar + Primitive>(mat: &DMatrix<T>) -> ImageBuffer<Luma<T>, Vec<T>> {
    let (nb_rows, nb_cols) = mat.shape();
    let mut img_buf = ImageBuffer::new(nb_cols as u32, nb_rows as u32);
    for (x, y, pixel) in img_buf.enumerate_pixels_mut() {
        *pixel = Luma([mat[(y as usize, x as usize)]]);
    }
    img_buf
}

/// Convert an RGB matrix into an RGB image.
#[allow(clippy::cast_possible_truncation)]
pub fn rgb_from_matrix(mat: &DMatrix<(u8, u8, u8)>) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
    let (nb_rows, nb_cols) = mat.shape();
    let mut img_buf = ImageBuffer::new(nb_cols as u32, nb_rows as u32);
    for (x, y, pixel) in img_buf.enumerate_pixels_mut() {
        let (r, g, b) = mat[(y as usize, x as usize)];
        *pixel = Rgb([r, g, b]);
    }
    img_buf
}

/// Convert a gray image into a matrix.
/// Inverse operation of `image_from_matrix`.
pub fn matrix_from_image<T: Scalar + Primitive>(img: ImageBuffer<Luma<T>, Vec<T>>) -> DMatrix<T> {
    let (width, height) = img.dimensions();
    DMatrix::from_row_slice(height as usize, width as usize, &img.into_raw())
}

/// Sensor samples of a decoded grayscale image, widened to 16 bits.
///
/// 8-bit samples keep their value (no rescaling to the 16-bit range).
/// Returns `None` for images with color or alpha channels.
pub fn gray16_matrix(img: DynamicImage) -> Option<DMatrix<u16>> {
    match img {
        DynamicImage::ImageLuma16(buf) => Some(matrix_from_image(buf)),
        DynamicImage::ImageLuma8(buf) => Some(matrix_from_image(buf).map(u16::from)),
        _ => None,
    }
}

/// Undo the stretch of samples from `[0, max_sample]` to `[0, full_range]`.
///
/// The PNM decoder rescales files whose maxval is not 255 or 65535
/// (a 12-bit sensor dump with maxval 4095 for instance). Since the stretch
/// factor is at least one, rounding back gives the stored samples exactly.
pub fn unstretch(mat: &mut DMatrix<u16>, max_sample: u32, full_range: u32) {
    if max_sample == 0 || max_sample >= full_range {
        return;
    }
    let ratio = f64::from(max_sample) / f64::from(full_range);
    mat.apply(|v| *v = (f64::from(*v) * ratio).round() as u16);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_rows_follow_image_rows() {
        let img = ImageBuffer::from_raw(3, 2, vec![1u16, 2, 3, 4, 5, 6]).unwrap();
        let mat = matrix_from_image::<u16>(img);
        assert_eq!(mat.shape(), (2, 3));
        assert_eq!(mat[(0, 2)], 3);
        assert_eq!(mat[(1, 0)], 4);
        let back = image_from_matrix(&mat);
        assert_eq!(back.into_raw(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn eight_bit_samples_are_not_rescaled() {
        let img = ImageBuffer::from_raw(2, 1, vec![7u8, 255]).unwrap();
        let mat = gray16_matrix(DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(mat[(0, 0)], 7);
        assert_eq!(mat[(0, 1)], 255);
    }

    #[test]
    fn color_images_are_rejected() {
        let img = ImageBuffer::from_raw(1, 1, vec![1u8, 2, 3]).unwrap();
        assert!(gray16_matrix(DynamicImage::ImageRgb8(img)).is_none());
    }

    #[test]
    fn stretched_twelve_bit_samples_are_restored() {
        // 100 and 4095 with maxval 4095, as stretched by the decoder.
        let mut mat = DMatrix::from_row_slice(1, 3, &[1600u16, 65535, 0]);
        unstretch(&mut mat, 4095, 65535);
        assert_eq!(mat.as_slice(), &[100, 4095, 0]);
    }

    #[test]
    fn every_stretched_sample_maps_back() {
        for &(max_sample, full_range) in &[(4095u32, 65535u32), (1023, 65535), (300, 65535), (100, 255)] {
            let stretch = full_range as f32 / max_sample as f32;
            let raw: Vec<u16> = (0..=max_sample as u16).collect();
            let stretched: Vec<u16> = raw
                .iter()
                .map(|&v| (v as f32 * stretch).round() as u16)
                .collect();
            let mut mat = DMatrix::from_row_slice(1, raw.len(), &stretched);
            unstretch(&mut mat, max_sample, full_range);
            assert_eq!(mat.as_slice(), raw.as_slice(), "maxval {}", max_sample);
        }
    }

    #[test]
    fn full_range_samples_are_untouched() {
        let mut mat = DMatrix::from_row_slice(1, 2, &[1234u16, 65535]);
        unstretch(&mut mat, 65535, 65535);
        assert_eq!(mat.as_slice(), &[1234, 65535]);
    }
}
