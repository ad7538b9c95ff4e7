// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Batch evaluation of predicted sequences against reference sequences.
//!
//! A failing pair (unreadable file, different dimensions, ...)
//! is logged and skipped, the rest of the batch is still evaluated.

use image::RgbImage;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::{box_filter, psnr, ssim, Error as MetricError};
use crate::dataset::depth_bin::{self, Frame, FramePair};
use crate::misc::interop::{self, GrayScaling};
use crate::misc::type_aliases::{DepthMap, Float, Image};

/// Window used to compare pictures, smaller than for depth frames.
pub const PICTURE_WINDOW_SIZE: usize = 7;

/// Data range of 8 bits images.
pub const GRAY_DATA_RANGE: Float = 255.0;

/// Data range of normalized depth values.
pub const DEPTH_DATA_RANGE: Float = 1.0;

/// Errors of the evaluation helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// Metric computation failed.
    #[error(transparent)]
    Metric(#[from] MetricError),
    /// A depth frame could not be read.
    #[error(transparent)]
    Dataset(#[from] depth_bin::Error),
    /// An image could not be decoded or encoded.
    #[error(transparent)]
    Image(#[from] image::ImageError),
    /// A directory could not be listed.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path of the directory.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// What is actually compared in a pair of depth frames.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// The raw depth values.
    Depth,
    /// The 8 bits gray renditions of the depth frames.
    Gray(GrayScaling),
}

/// Configuration of a sequence evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Side length of the SSIM window.
    pub window_size: usize,
    /// Data range of the compared values.
    pub data_range: Float,
    /// Width of the depth frames.
    pub width: usize,
    /// Height of the depth frames.
    pub height: usize,
    /// Predicted frame `i` is compared to reference frame `i + reference_offset`.
    pub reference_offset: usize,
    /// Compare raw depth or gray images.
    pub input: Input,
}

impl Config {
    /// Compare the gray images of the frames, with a data range of 255.
    ///
    /// The window is the same 11x11 default as for raw depth,
    /// not the 7x7 window used for pictures (`PICTURE_WINDOW_SIZE`).
    pub fn gray() -> Self {
        Self {
            window_size: ssim::DEFAULT_WINDOW_SIZE,
            data_range: GRAY_DATA_RANGE,
            width: depth_bin::DEFAULT_WIDTH,
            height: depth_bin::DEFAULT_HEIGHT,
            reference_offset: depth_bin::DEFAULT_REFERENCE_OFFSET,
            input: Input::Gray(GrayScaling::Unit),
        }
    }

    /// Compare the raw depth values, expected in [0, 1].
    pub fn depth() -> Self {
        Self {
            data_range: DEPTH_DATA_RANGE,
            input: Input::Depth,
            ..Self::gray()
        }
    }

    /// Check that the window fits the frames and that the data range is usable,
    /// before evaluating any pair.
    pub fn validate(&self) -> Result<(), MetricError> {
        box_filter::check_window((self.height, self.width), self.window_size)?;
        if self.data_range.is_finite() && self.data_range > 0.0 {
            Ok(())
        } else {
            Err(MetricError::InvalidDataRange(self.data_range))
        }
    }

    /// Values actually given to the metrics for a depth frame.
    pub fn prepare(&self, depth: &DepthMap) -> Image {
        match self.input {
            Input::Depth => interop::float_matrix(depth),
            Input::Gray(scaling) => {
                interop::float_matrix(&interop::gray_from_depth(depth, scaling))
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::gray()
    }
}

/// Metrics of one evaluated pair.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameMetrics {
    /// File name of the predicted frame.
    pub predicted: String,
    /// File name of the reference frame.
    pub reference: String,
    /// Structural similarity.
    pub ssim: Float,
    /// Peak signal to noise ratio in dB.
    pub psnr: Float,
}

/// Metrics of all the evaluated pairs of a batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    /// Evaluated pairs, in evaluation order.
    pub frames: Vec<FrameMetrics>,
}

impl Summary {
    /// Average SSIM, `None` if nothing was evaluated.
    pub fn mean_ssim(&self) -> Option<Float> {
        self.mean_of(|m| m.ssim)
    }

    /// Average PSNR, `None` if nothing was evaluated.
    /// It is infinite as soon as one pair is identical.
    pub fn mean_psnr(&self) -> Option<Float> {
        self.mean_of(|m| m.psnr)
    }

    fn mean_of<F: Fn(&FrameMetrics) -> Float>(&self, f: F) -> Option<Float> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.iter().map(f).sum::<Float>() / self.frames.len() as Float)
        }
    }

    /// Write one csv record per evaluated pair.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&["predicted", "reference", "ssim", "psnr"])?;
        for m in &self.frames {
            csv_writer.write_record(&[
                m.predicted.clone(),
                m.reference.clone(),
                m.ssim.to_string(),
                m.psnr.to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

// Depth sequences ###################################################

/// SSIM and PSNR of a predicted frame against its reference frame.
pub fn evaluate_pair(
    predicted: &DepthMap,
    reference: &DepthMap,
    config: &Config,
) -> Result<(Float, Float), MetricError> {
    let predicted = config.prepare(predicted);
    let reference = config.prepare(reference);
    let ssim_value = ssim::similarity(
        &reference,
        &predicted,
        config.data_range,
        config.window_size,
    )?;
    let psnr_value = psnr::psnr(&reference, &predicted, config.data_range)?;
    Ok((ssim_value, psnr_value))
}

/// Evaluate all pairs, skipping the ones that fail.
pub fn evaluate_sequence(pairs: &[FramePair], config: &Config) -> Summary {
    let mut summary = Summary::default();
    for pair in pairs {
        match evaluate_frame_pair(pair, config) {
            Ok(metrics) => {
                info!(
                    "{} vs {}: SSIM {:.4}, PSNR {:.2} dB",
                    metrics.predicted, metrics.reference, metrics.ssim, metrics.psnr
                );
                summary.frames.push(metrics);
            }
            Err(error) => warn!(
                "skipping {} vs {}: {}",
                pair.predicted.path.display(),
                pair.reference.path.display(),
                error
            ),
        }
    }
    summary
}

fn evaluate_frame_pair(pair: &FramePair, config: &Config) -> Result<FrameMetrics, Error> {
    let predicted = load_frame(&pair.predicted, config)?;
    let reference = load_frame(&pair.reference, config)?;
    let (ssim, psnr) = evaluate_pair(&predicted, &reference, config)?;
    Ok(FrameMetrics {
        predicted: file_name(&pair.predicted.path),
        reference: file_name(&pair.reference.path),
        ssim,
        psnr,
    })
}

fn load_frame(frame: &Frame, config: &Config) -> Result<DepthMap, Error> {
    let depth = depth_bin::read_depth_bin(&frame.path, config.width, config.height)?;
    if config.input == Input::Depth {
        warn_out_of_range(&frame.path, &depth);
    }
    Ok(depth)
}

fn warn_out_of_range(path: &Path, depth: &DepthMap) {
    let d_min = depth.iter().cloned().fold(f32::INFINITY, f32::min);
    let d_max = depth.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    if d_min < 0.0 || d_max > 1.0 {
        warn!(
            "{} has values outside [0, 1]: {}, {}",
            path.display(),
            d_min,
            d_max
        );
    }
}

/// Write a gray png next to each depth frame, with the same name.
///
/// Frames that cannot be converted are skipped.
/// Returns the number of written images.
pub fn convert_sequence(frames: &[Frame], config: &Config) -> usize {
    let scaling = match config.input {
        Input::Gray(scaling) => scaling,
        Input::Depth => GrayScaling::Unit,
    };
    let mut nb_written = 0;
    for frame in frames {
        match convert_frame(frame, config, scaling) {
            Ok(png_path) => {
                info!("{} -> {}", frame.path.display(), png_path.display());
                nb_written += 1;
            }
            Err(error) => warn!("cannot convert {}: {}", frame.path.display(), error),
        }
    }
    nb_written
}

fn convert_frame(frame: &Frame, config: &Config, scaling: GrayScaling) -> Result<PathBuf, Error> {
    let depth = depth_bin::read_depth_bin(&frame.path, config.width, config.height)?;
    let png_path = frame.path.with_file_name(depth_bin::frame_file_name(
        frame.index,
        depth_bin::PNG_EXTENSION,
    ));
    interop::save_gray_png(&interop::gray_from_depth(&depth, scaling), &png_path)?;
    Ok(png_path)
}

// Pictures ##########################################################

/// SSIM (on luma) and PSNR (on rgb samples) of two pictures, with a data range of 255.
pub fn compare_pictures(
    predicted: &RgbImage,
    reference: &RgbImage,
    window_size: usize,
) -> Result<(Float, Float), MetricError> {
    let luma = |img: &RgbImage| {
        interop::float_matrix(&interop::matrix_from_image(image::imageops::grayscale(img)))
    };
    let rgb = |img: &RgbImage| interop::float_matrix(&interop::rgb_matrix_from_image(img));
    let ssim_value = ssim::similarity(
        &luma(predicted),
        &luma(reference),
        GRAY_DATA_RANGE,
        window_size,
    )?;
    let psnr_value = psnr::psnr(&rgb(reference), &rgb(predicted), GRAY_DATA_RANGE)?;
    Ok((ssim_value, psnr_value))
}

/// Compare each png of `predicted_dir` with the png of the same name in `reference_dir`.
///
/// Pictures without counterpart, unreadable or of different sizes are skipped.
pub fn evaluate_pictures<P: AsRef<Path>, Q: AsRef<Path>>(
    predicted_dir: P,
    reference_dir: Q,
    window_size: usize,
) -> Result<Summary, Error> {
    let reference_dir = reference_dir.as_ref();
    let mut summary = Summary::default();
    for name in png_names(predicted_dir.as_ref())? {
        let predicted_path = predicted_dir.as_ref().join(&name);
        let reference_path = reference_dir.join(&name);
        if !reference_path.is_file() {
            warn!("no reference picture for {}, skipping", name);
            continue;
        }
        match compare_picture_files(&predicted_path, &reference_path, window_size) {
            Ok((ssim, psnr)) => {
                info!("{}: SSIM {:.4}, PSNR {:.4}", name, ssim, psnr);
                summary.frames.push(FrameMetrics {
                    predicted: name.clone(),
                    reference: name,
                    ssim,
                    psnr,
                });
            }
            Err(error) => warn!("skipping {}: {}", name, error),
        }
    }
    Ok(summary)
}

fn compare_picture_files(
    predicted_path: &Path,
    reference_path: &Path,
    window_size: usize,
) -> Result<(Float, Float), Error> {
    let predicted = image::open(predicted_path)?.to_rgb8();
    let reference = image::open(reference_path)?.to_rgb8();
    Ok(compare_pictures(&predicted, &reference, window_size)?)
}

// Sorted names of the png files of a directory.
fn png_names(dir: &Path) -> Result<Vec<String>, Error> {
    let io_error = |source: io::Error| Error::Io {
        path: dir.to_owned(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_png = path.extension().map_or(false, |ext| ext == "png");
        if is_png && path.is_file() {
            names.push(file_name(&path));
        }
    }
    names.sort();
    Ok(names)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// TESTS #############################################################
