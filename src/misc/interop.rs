// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interoperability conversions between the image and matrix types.

use image::{GrayImage, ImageResult, Luma, RgbImage};
use nalgebra::{DMatrix, Scalar};
use num_traits::AsPrimitive;
use std::path::Path;

use crate::misc::type_aliases::{DepthMap, Float, GrayMap, Image};

/// How depth values are mapped to 8 bits intensities.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GrayScaling {
    /// Depth is expected in [0, 1] and multiplied by 255.
    /// Values out of that range saturate.
    Unit,
    /// The [min, max] range of the frame is stretched to [0, 255].
    /// A flat frame is black.
    MinMax,
}

/// Convert a depth frame into a gray matrix.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
pub fn gray_from_depth(depth: &DepthMap, scaling: GrayScaling) -> GrayMap {
    // Float to int casts saturate, and NaN becomes 0.
    match scaling {
        GrayScaling::Unit => depth.map(|d| (d * 255.0) as u8),
        GrayScaling::MinMax => match min_max(depth) {
            Some((d_min, d_max)) if d_max > d_min => {
                depth.map(|d| ((d - d_min) / (d_max - d_min) * 255.0) as u8)
            }
            _ => DMatrix::zeros(depth.nrows(), depth.ncols()),
        },
    }
}

fn min_max(depth: &DepthMap) -> Option<(f32, f32)> {
    depth
        .iter()
        .filter(|d| d.is_finite())
        .fold(None, |acc, &d| match acc {
            None => Some((d, d)),
            Some((d_min, d_max)) => Some((d_min.min(d), d_max.max(d))),
        })
}

/// Cast any numeric matrix into a matrix of `Float`.
pub fn float_matrix<T>(mat: &DMatrix<T>) -> Image
where
    T: Scalar + Copy + AsPrimitive<Float>,
{
    mat.map(|x| x.as_())
}

/// Convert an `u8` matrix into a `GrayImage`.
/// Inverse operation of `matrix_from_image`.
///
/// Performs a transposition to accomodate for the
/// column major matrix into the row major image.
#[allow(clippy::cast_possible_truncation)]
pub fn image_from_matrix(mat: &GrayMap) -> GrayImage {
    let (nb_rows, nb_cols) = mat.shape();
    let mut img_buf = GrayImage::new(nb_cols as u32, nb_rows as u32);
    for (x, y, pixel) in img_buf.enumerate_pixels_mut() {
        *pixel = Luma([mat[(y as usize, x as usize)]]);
    }
    img_buf
}

/// Convert a `GrayImage` into an `u8` matrix.
/// Inverse operation of `image_from_matrix`.
pub fn matrix_from_image(img: GrayImage) -> GrayMap {
    let (width, height) = img.dimensions();
    DMatrix::from_row_slice(height as usize, width as usize, &img.into_raw())
}

/// Convert an `RgbImage` into an `u8` matrix with 3 columns per pixel,
/// in the `r g b` order.
pub fn rgb_matrix_from_image(img: &RgbImage) -> GrayMap {
    let (width, height) = img.dimensions();
    DMatrix::from_row_slice(height as usize, 3 * width as usize, img.as_raw())
}

/// Save a gray matrix as an 8 bits png image.
pub fn save_gray_png<P: AsRef<Path>>(mat: &GrayMap, file_path: P) -> ImageResult<()> {
    image_from_matrix(mat).save_with_format(file_path, image::ImageFormat::Png)
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;
    use image::Rgb;

    #[test]
    fn unit_scaling_saturates() {
        let depth = DMatrix::from_row_slice(1, 5, &[0.0, 0.5, 1.0, 1.5, -0.2]);
        let gray = gray_from_depth(&depth, GrayScaling::Unit);
        assert_eq!(gray, DMatrix::from_row_slice(1, 5, &[0, 127, 255, 255, 0]));
    }

    #[test]
    fn nan_is_black() {
        let depth = DMatrix::from_row_slice(1, 2, &[f32::NAN, 1.0]);
        let gray = gray_from_depth(&depth, GrayScaling::Unit);
        assert_eq!(gray, DMatrix::from_row_slice(1, 2, &[0, 255]));
    }

    #[test]
    fn min_max_scaling_stretches() {
        let depth = DMatrix::from_row_slice(1, 3, &[2.0, 3.0, 4.0]);
        let gray = gray_from_depth(&depth, GrayScaling::MinMax);
        assert_eq!(gray, DMatrix::from_row_slice(1, 3, &[0, 127, 255]));
    }

    #[test]
    fn flat_frame_is_black() {
        let depth = DMatrix::repeat(2, 3, 0.7);
        let gray = gray_from_depth(&depth, GrayScaling::MinMax);
        assert_eq!(gray, DMatrix::zeros(2, 3));
    }

    #[test]
    fn image_is_row_major() {
        let mat = DMatrix::from_row_slice(2, 3, &[1, 2, 3, 4, 5, 6]);
        let img = image_from_matrix(&mat);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 0), &Luma([3]));
        assert_eq!(img.get_pixel(0, 1), &Luma([4]));
        assert_eq!(matrix_from_image(img), mat);
    }

    #[test]
    fn rgb_samples_are_interleaved() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(1, 0, Rgb([10, 20, 30]));
        let mat = rgb_matrix_from_image(&img);
        assert_eq!(mat, DMatrix::from_row_slice(1, 6, &[0, 0, 0, 10, 20, 30]));
    }

    #[test]
    fn float_matrix_casts() {
        let mat = DMatrix::from_row_slice(1, 2, &[0_u8, 255]);
        assert_eq!(float_matrix(&mat), DMatrix::from_row_slice(1, 2, &[0.0, 255.0]));
    }
}
