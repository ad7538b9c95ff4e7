// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Uniform (box) filtering of matrices.
//!
//! The filter is separable, so it is computed as a running sum along columns,
//! followed by the same pass on the transposed result.
//! Out of bounds samples are obtained by symmetric extension
//! of the borders: `d c b a | a b c d | d c b a`.

use nalgebra::DMatrix;

use super::Error;
use crate::misc::type_aliases::Float;

/// Mean of the `window_size x window_size` neighborhood centered at each pixel.
///
/// The window size must be odd, strictly positive,
/// and not exceed any of the two image dimensions.
/// Invalid windows are rejected, never clamped.
pub fn compute_local_means(
    image: &DMatrix<Float>,
    window_size: usize,
) -> Result<DMatrix<Float>, Error> {
    check_window(image.shape(), window_size)?;
    Ok(box_filter(image, window_size))
}

/// Verify that a window is usable on an image of the given shape.
pub fn check_window(shape: (usize, usize), window_size: usize) -> Result<(), Error> {
    let (nb_rows, nb_cols) = shape;
    if window_size == 0 || window_size % 2 == 0 {
        Err(Error::InvalidWindowSize(window_size))
    } else if window_size > nb_rows || window_size > nb_cols {
        Err(Error::WindowExceedsShape { window_size, shape })
    } else {
        Ok(())
    }
}

/// Box filter with an already validated window.
pub(crate) fn box_filter(image: &DMatrix<Float>, window_size: usize) -> DMatrix<Float> {
    let vertical = filter_columns(image, window_size);
    filter_columns(&vertical.transpose(), window_size).transpose()
}

// Matrices are column major, so each chunk of `nb_rows` elements is a column.
fn filter_columns(mat: &DMatrix<Float>, window_size: usize) -> DMatrix<Float> {
    let (nb_rows, nb_cols) = mat.shape();
    let mut filtered = DMatrix::zeros(nb_rows, nb_cols);
    mat.as_slice()
        .chunks_exact(nb_rows)
        .zip(filtered.as_mut_slice().chunks_exact_mut(nb_rows))
        .for_each(|(column, out)| uniform_1d(column, out, window_size));
    filtered
}

/// Running window mean of a 1D signal with symmetric border extension.
///
/// Requires `window_size / 2 < input.len()`.
fn uniform_1d(input: &[Float], output: &mut [Float], window_size: usize) {
    let len = input.len() as isize;
    let radius = (window_size / 2) as isize;
    let sample = |i: isize| input[reflect(i, len)];
    let norm = window_size as Float;
    let mut sum: Float = (-radius..=radius).map(sample).sum();
    output[0] = sum / norm;
    for i in 1..len {
        sum += sample(i + radius) - sample(i - radius - 1);
        output[i as usize] = sum / norm;
    }
}

// Only one reflection is needed since the radius is smaller than the length.
fn reflect(i: isize, len: isize) -> usize {
    if i < 0 {
        (-i - 1) as usize
    } else if i >= len {
        (2 * len - 1 - i) as usize
    } else {
        i as usize
    }
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;
    use approx;

    const EPSILON: Float = 1e-12;

    #[test]
    fn constant_image_is_a_fixed_point() {
        let image = DMatrix::repeat(8, 13, 0.25);
        let means = compute_local_means(&image, 5).unwrap();
        assert!(approx::abs_diff_eq!(means, image, epsilon = EPSILON));
    }

    #[test]
    fn window_of_one_is_identity() {
        let image = DMatrix::from_fn(4, 6, |i, j| (i * 6 + j) as Float);
        let means = compute_local_means(&image, 1).unwrap();
        assert!(approx::abs_diff_eq!(means, image, epsilon = EPSILON));
    }

    #[test]
    fn borders_are_reflected() {
        // Each row is [1 2 3], reflected as 1 | 1 2 3 | 3.
        let image = DMatrix::from_fn(3, 3, |_, j| (j + 1) as Float);
        let means = compute_local_means(&image, 3).unwrap();
        let expected = DMatrix::from_fn(3, 3, |_, j| [4.0 / 3.0, 2.0, 8.0 / 3.0][j]);
        assert!(approx::abs_diff_eq!(means, expected, epsilon = EPSILON));
    }

    #[test]
    fn filters_both_directions_on_non_square_images() {
        // Single bright pixel in the middle of a 3x5 image.
        let mut image = DMatrix::zeros(3, 5);
        image[(1, 2)] = 9.0;
        let means = compute_local_means(&image, 3).unwrap();
        let expected = DMatrix::from_row_slice(
            3,
            5,
            &[
                0.0, 1.0, 1.0, 1.0, 0.0, //
                0.0, 1.0, 1.0, 1.0, 0.0, //
                0.0, 1.0, 1.0, 1.0, 0.0, //
            ],
        );
        assert!(approx::abs_diff_eq!(means, expected, epsilon = EPSILON));
    }

    #[test]
    fn mean_of_means_is_preserved_in_the_interior() {
        let image = DMatrix::from_fn(7, 7, |i, j| ((i * 7 + j) % 5) as Float);
        let means = compute_local_means(&image, 7).unwrap();
        let center = image.iter().sum::<Float>() / 49.0;
        assert!(approx::abs_diff_eq!(means[(3, 3)], center, epsilon = EPSILON));
    }

    #[test]
    fn even_and_zero_windows_are_rejected() {
        let image = DMatrix::zeros(16, 16);
        assert_eq!(
            compute_local_means(&image, 4),
            Err(Error::InvalidWindowSize(4))
        );
        assert_eq!(
            compute_local_means(&image, 0),
            Err(Error::InvalidWindowSize(0))
        );
    }

    #[test]
    fn window_larger_than_image_is_rejected() {
        let image = DMatrix::zeros(12, 10);
        assert_eq!(
            compute_local_means(&image, 11),
            Err(Error::WindowExceedsShape {
                window_size: 11,
                shape: (12, 10)
            })
        );
    }
}
