// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Assemble a sequence of `depthData<i>.png` images into a video with `ffmpeg`.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::info;

use crate::dataset::depth_bin::{self, FRAME_PREFIX, PNG_EXTENSION};

/// Default frame rate of the videos.
pub const DEFAULT_FPS: u32 = 30;

/// Errors when assembling a video.
#[derive(Debug, Error)]
pub enum Error {
    /// `ffmpeg -version` could not be run.
    #[error("ffmpeg is not installed or not in PATH")]
    FfmpegUnavailable,
    /// There is nothing to encode.
    #[error("no png frames in {0}")]
    NoFrames(PathBuf),
    /// `ffmpeg` ran but failed.
    #[error("ffmpeg failed: {stderr}")]
    Ffmpeg {
        /// Error output of ffmpeg.
        stderr: String,
    },
    /// The frames directory could not be listed.
    #[error(transparent)]
    Dataset(#[from] depth_bin::Error),
    /// `ffmpeg` could not be spawned.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Encode the png frames of `dir` into an H.264 video at `output`.
///
/// An existing output file is overwritten.
pub fn encode_sequence<P: AsRef<Path>, Q: AsRef<Path>>(
    dir: P,
    output: Q,
    fps: u32,
) -> Result<(), Error> {
    let dir = dir.as_ref();
    if depth_bin::list_frames(dir, PNG_EXTENSION)?.is_empty() {
        return Err(Error::NoFrames(dir.to_owned()));
    }
    check_ffmpeg()?;
    let result = Command::new("ffmpeg")
        .args(ffmpeg_args(dir, output.as_ref(), fps))
        .output()?;
    if !result.status.success() {
        return Err(Error::Ffmpeg {
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        });
    }
    info!("video saved to {}", output.as_ref().display());
    Ok(())
}

fn check_ffmpeg() -> Result<(), Error> {
    match Command::new("ffmpeg").arg("-version").output() {
        Ok(result) if result.status.success() => Ok(()),
        _ => Err(Error::FfmpegUnavailable),
    }
}

/// Arguments given to `ffmpeg` to encode the frames of `dir`.
pub fn ffmpeg_args(dir: &Path, output: &Path, fps: u32) -> Vec<OsString> {
    let pattern = dir.join(format!("{}%d{}", FRAME_PREFIX, PNG_EXTENSION));
    vec![
        "-r".into(),
        fps.to_string().into(),
        "-i".into(),
        pattern.into_os_string(),
        "-c:v".into(),
        "libx264".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-y".into(),
        output.as_os_str().to_owned(),
    ]
}

// TESTS #############################################################
