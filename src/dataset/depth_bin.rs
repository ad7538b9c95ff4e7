// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Raw depth frames recorded as `depthData<i>.bin` files.
//!
//! Each file holds `width * height` little endian f32 values, row after row.
//! Predicted and reference sequences live in two directories,
//! and predicted frame `i` is compared to reference frame `i + 1`.

use byteorder::{ByteOrder, LittleEndian};
use nalgebra::DMatrix;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::misc::type_aliases::DepthMap;

/// Prefix shared by all frame file names.
pub const FRAME_PREFIX: &str = "depthData";
/// Extension of raw depth frames.
pub const BIN_EXTENSION: &str = ".bin";
/// Extension of gray images rendered from depth frames.
pub const PNG_EXTENSION: &str = ".png";

/// Width of the recorded frames.
pub const DEFAULT_WIDTH: usize = 1920;
/// Height of the recorded frames.
pub const DEFAULT_HEIGHT: usize = 1080;

/// Offset between a predicted frame index and its reference frame index.
pub const DEFAULT_REFERENCE_OFFSET: usize = 1;

/// Errors when reading depth frames.
#[derive(Debug, Error)]
pub enum Error {
    /// The file or directory could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path of the file or directory.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The frame dimensions do not fit in memory.
    #[error("invalid depth frame dimensions {width}x{height}")]
    InvalidDimensions {
        /// Frame width.
        width: usize,
        /// Frame height.
        height: usize,
    },
    /// The buffer does not contain exactly one frame.
    #[error("expected {expected} bytes for a {width}x{height} depth frame, got {actual}")]
    SizeMismatch {
        /// Number of bytes of a frame.
        expected: usize,
        /// Number of bytes read.
        actual: usize,
        /// Frame width.
        width: usize,
        /// Frame height.
        height: usize,
    },
}

/// A numbered frame file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Number `i` in `depthData<i>`.
    pub index: usize,
    /// Full path of the file.
    pub path: PathBuf,
}

/// A predicted frame and the reference frame it should be compared to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePair {
    /// Frame of the predicted sequence.
    pub predicted: Frame,
    /// Frame of the reference sequence.
    pub reference: Frame,
}

/// Decode a raw buffer into a `height x width` depth map.
pub fn depth_from_bytes(bytes: &[u8], width: usize, height: usize) -> Result<DepthMap, Error> {
    let nb_samples = width
        .checked_mul(height)
        .filter(|n| n.checked_mul(4).is_some())
        .ok_or(Error::InvalidDimensions { width, height })?;
    let expected = nb_samples * 4;
    if bytes.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: bytes.len(),
            width,
            height,
        });
    }
    let mut buffer_f32 = vec![0.0; nb_samples];
    LittleEndian::read_f32_into(bytes, &mut buffer_f32);
    Ok(DMatrix::from_row_slice(height, width, &buffer_f32))
}

/// Read a raw depth frame file.
pub fn read_depth_bin<P: AsRef<Path>>(
    file_path: P,
    width: usize,
    height: usize,
) -> Result<DepthMap, Error> {
    let file_path = file_path.as_ref();
    let bytes = fs::read(file_path).map_err(|source| Error::Io {
        path: file_path.to_owned(),
        source,
    })?;
    depth_from_bytes(&bytes, width, height)
}

/// Name of the file of frame `index`, for example `depthData3.png`.
pub fn frame_file_name(index: usize, extension: &str) -> String {
    format!("{}{}{}", FRAME_PREFIX, index, extension)
}

/// Index of a frame from its file name,
/// `None` if the name is not `depthData<digits><extension>`.
pub fn frame_index(file_name: &str, extension: &str) -> Option<usize> {
    parse::frame_name(file_name, extension)
}

/// All frames with the given extension in a directory, sorted by index.
pub fn list_frames<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<Frame>, Error> {
    let dir = dir.as_ref();
    let io_error = |source: io::Error| Error::Io {
        path: dir.to_owned(),
        source,
    };
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let file_name = entry.file_name();
        if let Some(index) = file_name.to_str().and_then(|n| frame_index(n, extension)) {
            frames.push(Frame {
                index,
                path: entry.path(),
            });
        }
    }
    frames.sort_by_key(|frame| frame.index);
    Ok(frames)
}

/// Pair each predicted frame `i` with the reference frame `i + offset`.
///
/// Predicted frames without reference counterpart, or whose index overflows
/// once shifted, are skipped.
pub fn pair_frames(predicted: &[Frame], reference: &[Frame], offset: usize) -> Vec<FramePair> {
    let references: HashMap<usize, &Frame> = reference.iter().map(|f| (f.index, f)).collect();
    predicted
        .iter()
        .filter_map(|frame| {
            let ref_index = match frame.index.checked_add(offset) {
                Some(ref_index) => ref_index,
                None => {
                    warn!("index of {} is too large, skipping", frame.path.display());
                    return None;
                }
            };
            match references.get(&ref_index) {
                Some(&ref_frame) => Some(FramePair {
                    predicted: frame.clone(),
                    reference: ref_frame.clone(),
                }),
                None => {
                    warn!(
                        "no reference frame {} for {}, skipping",
                        ref_index,
                        frame.path.display()
                    );
                    None
                }
            }
        })
        .collect()
}

/// Parse frame file names.
mod parse {
    use super::FRAME_PREFIX;
    use nom::{
        bytes::complete::tag,
        character::complete::digit1,
        combinator::{all_consuming, map_res},
        sequence::delimited,
        IResult,
    };

    pub fn frame_name(file_name: &str, extension: &str) -> Option<usize> {
        index_between(file_name, extension).ok().map(|(_, index)| index)
    }

    // depthData<digits><extension>, nothing before nor after.
    fn index_between<'a>(input: &'a str, extension: &str) -> IResult<&'a str, usize> {
        all_consuming(delimited(
            tag(FRAME_PREFIX),
            map_res(digit1, |digits: &str| digits.parse::<usize>()),
            tag(extension),
        ))(input)
    }
}

// TESTS #############################################################
