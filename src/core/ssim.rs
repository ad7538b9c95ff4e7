// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structural similarity (SSIM) from local window statistics.
//!
//! Local means, variances and covariance are all obtained with box filters
//! over whole matrices, then combined pixel by pixel into
//! the product of luminance, contrast and structure terms.

use itertools::izip;
use nalgebra::DMatrix;

use super::box_filter::{box_filter, check_window};
use super::{check_data_range, check_same_shape, Error};
use crate::misc::type_aliases::Float;

/// Default side length of the square window.
pub const DEFAULT_WINDOW_SIZE: usize = 11;

const K1: Float = 0.01;
const K2: Float = 0.03;

/// Stabilization constants, derived from the data range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Constants {
    /// Luminance constant `(K1 * L)^2`.
    pub c1: Float,
    /// Contrast constant `(K2 * L)^2`.
    pub c2: Float,
    /// Structure constant `c2 / 2`.
    pub c3: Float,
}

impl Constants {
    /// Constants for data spanning `data_range`
    /// (1.0 for normalized floats, 255.0 for 8 bits gray images).
    pub fn new(data_range: Float) -> Self {
        let c1 = (K1 * data_range).powi(2);
        let c2 = (K2 * data_range).powi(2);
        Self { c1, c2, c3: c2 / 2.0 }
    }

    /// SSIM of one pixel, given its local statistics.
    ///
    /// `mean_aa`, `mean_bb` and `mean_ab` are the local means of
    /// `a*a`, `b*b` and `a*b`.
    /// Variances are clipped to zero but the covariance is not.
    pub fn pixel(
        &self,
        mu_a: Float,
        mu_b: Float,
        mean_aa: Float,
        mean_bb: Float,
        mean_ab: Float,
    ) -> Float {
        let var_a = (mean_aa - mu_a * mu_a).max(0.0);
        let var_b = (mean_bb - mu_b * mu_b).max(0.0);
        let cov_ab = mean_ab - mu_a * mu_b;
        let sigma_a = var_a.sqrt();
        let sigma_b = var_b.sqrt();
        let luminance = (2.0 * mu_a * mu_b + self.c1) / (mu_a * mu_a + mu_b * mu_b + self.c1);
        let contrast = (2.0 * sigma_a * sigma_b + self.c2) / (var_a + var_b + self.c2);
        let structure = (cov_ab + self.c3) / (sigma_a * sigma_b + self.c3);
        luminance * contrast * structure
    }
}

/// Mean structural similarity of two images with the same shape.
///
/// Returns a value in (-1, 1], 1 meaning identical images.
/// See `similarity_map` for the errors.
pub fn similarity(
    image_a: &DMatrix<Float>,
    image_b: &DMatrix<Float>,
    data_range: Float,
    window_size: usize,
) -> Result<Float, Error> {
    similarity_map(image_a, image_b, data_range, window_size).map(|map| map.mean())
}

/// Same as `similarity` with the default window of 11x11 pixels.
pub fn similarity_default(
    image_a: &DMatrix<Float>,
    image_b: &DMatrix<Float>,
    data_range: Float,
) -> Result<Float, Error> {
    similarity(image_a, image_b, data_range, DEFAULT_WINDOW_SIZE)
}

/// Per pixel structural similarity of two images with the same shape.
///
/// Fails if the shapes differ, if the window is not odd and positive
/// or does not fit in the images, or if the data range is not positive.
pub fn similarity_map(
    image_a: &DMatrix<Float>,
    image_b: &DMatrix<Float>,
    data_range: Float,
    window_size: usize,
) -> Result<DMatrix<Float>, Error> {
    check_same_shape(image_a, image_b)?;
    check_window(image_a.shape(), window_size)?;
    check_data_range(data_range)?;

    let mu_a = box_filter(image_a, window_size);
    let mu_b = box_filter(image_b, window_size);
    let mean_aa = box_filter(&image_a.component_mul(image_a), window_size);
    let mean_bb = box_filter(&image_b.component_mul(image_b), window_size);
    let mean_ab = box_filter(&image_a.component_mul(image_b), window_size);

    let constants = Constants::new(data_range);
    let ssim_values: Vec<Float> = izip!(
        mu_a.iter(),
        mu_b.iter(),
        mean_aa.iter(),
        mean_bb.iter(),
        mean_ab.iter()
    )
    .map(|(&mu_a, &mu_b, &aa, &bb, &ab)| constants.pixel(mu_a, mu_b, aa, bb, ab))
    .collect();

    let (nb_rows, nb_cols) = image_a.shape();
    Ok(DMatrix::from_vec(nb_rows, nb_cols, ssim_values))
}

// TESTS #############################################################
