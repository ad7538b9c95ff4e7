// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mean squared error and peak signal to noise ratio.

use nalgebra::DMatrix;

use super::{check_data_range, check_same_shape, Error};
use crate::misc::type_aliases::Float;

/// Mean of the squared differences of two images with the same shape.
pub fn mse(a: &DMatrix<Float>, b: &DMatrix<Float>) -> Result<Float, Error> {
    check_same_shape(a, b)?;
    if a.is_empty() {
        return Err(Error::EmptyImage);
    }
    Ok((a - b).norm_squared() / a.len() as Float)
}

/// Peak signal to noise ratio in decibels: `10 log10(data_range^2 / mse)`.
///
/// Identical images have a PSNR of positive infinity.
pub fn psnr(a: &DMatrix<Float>, b: &DMatrix<Float>, data_range: Float) -> Result<Float, Error> {
    check_data_range(data_range)?;
    let mse = mse(a, b)?;
    if mse == 0.0 {
        Ok(Float::INFINITY)
    } else {
        Ok(10.0 * (data_range * data_range / mse).log10())
    }
}

// TESTS #############################################################
