// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Offline evaluation of predicted depth map sequences.
//!
//! The `core` module holds the similarity metrics (SSIM and PSNR)
//! computed over `nalgebra` matrices.
//! Everything else (decoding depth frames, pairing sequences, drawing,
//! assembling videos) is built on top of it.

#![warn(missing_docs)]

pub mod core;
pub mod dataset;
pub mod eval;
pub mod misc;
pub mod video;
