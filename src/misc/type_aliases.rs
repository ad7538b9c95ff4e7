// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Type aliases for common types used all over the code base.

use nalgebra::DMatrix;

/// Metrics are computed in f64,
/// depth frames are stored as f32 on disk.
pub type Float = f64;

/// An image of floating point samples, as fed to the metrics.
pub type Image = DMatrix<Float>;

/// A decoded depth frame.
pub type DepthMap = DMatrix<f32>;

/// An 8 bits gray image.
pub type GrayMap = DMatrix<u8>;
