// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Core functionalities: windowed structural similarity and PSNR.

use nalgebra::DMatrix;
use thiserror::Error;

use crate::misc::type_aliases::Float;

pub mod box_filter;
pub mod psnr;
pub mod ssim;

/// Errors of the metric computations.
///
/// Each of them only concerns a single comparison,
/// the next pair of images can be compared as usual.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The two compared images do not have the same `(rows, cols)` dimensions.
    #[error("images must have the same dimensions, got {left:?} and {right:?}")]
    ShapeMismatch {
        /// Shape of the first image.
        left: (usize, usize),
        /// Shape of the second image.
        right: (usize, usize),
    },
    /// Window sizes must be odd and strictly positive.
    #[error("window size must be odd and positive, got {0}")]
    InvalidWindowSize(usize),
    /// The window does not fit into the image.
    #[error("window size {window_size} exceeds image dimensions {shape:?}")]
    WindowExceedsShape {
        /// Requested window side length.
        window_size: usize,
        /// Shape of the filtered image.
        shape: (usize, usize),
    },
    /// Metrics are not defined over images without pixels.
    #[error("cannot compare empty images")]
    EmptyImage,
    /// The data range scales the metrics constants and must be positive.
    #[error("data range must be positive and finite, got {0}")]
    InvalidDataRange(Float),
}

/// Check that two images have exactly the same shape.
pub fn check_same_shape(a: &DMatrix<Float>, b: &DMatrix<Float>) -> Result<(), Error> {
    if a.shape() == b.shape() {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            left: a.shape(),
            right: b.shape(),
        })
    }
}

fn check_data_range(data_range: Float) -> Result<(), Error> {
    if data_range.is_finite() && data_range > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDataRange(data_range))
    }
}
