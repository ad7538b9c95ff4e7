// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx;
use std::fs;
use std::path::{Path, PathBuf};

use depth_eval::dataset::depth_bin::{self, BIN_EXTENSION, PNG_EXTENSION};
use depth_eval::eval::{self, Config};

const WIDTH: usize = 12;
const HEIGHT: usize = 10;

struct TempDir(PathBuf);

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("depth_eval_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        TempDir(path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn frame_values(seed: usize) -> Vec<f32> {
    (0..WIDTH * HEIGHT)
        .map(|k| ((k * (seed + 3)) % 17) as f32 / 16.0)
        .collect()
}

fn write_frame(dir: &Path, index: usize, values: &[f32]) {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    let name = depth_bin::frame_file_name(index, BIN_EXTENSION);
    fs::write(dir.join(name), bytes).unwrap();
}

fn small_config() -> Config {
    Config {
        window_size: 5,
        width: WIDTH,
        height: HEIGHT,
        ..Config::depth()
    }
}

#[test]
fn sequence_evaluation_skips_bad_pairs() {
    let predict_dir = TempDir::new("predict");
    let reference_dir = TempDir::new("reference");
    for index in 0..4 {
        write_frame(&predict_dir.0, index, &frame_values(index));
    }
    // Reference i+1 equals prediction i for the first pair only.
    write_frame(&reference_dir.0, 1, &frame_values(0));
    write_frame(&reference_dir.0, 2, &frame_values(7));
    write_frame(&reference_dir.0, 3, &frame_values(2)[..WIDTH]);

    let config = small_config();
    let predicted = depth_bin::list_frames(&predict_dir.0, BIN_EXTENSION).unwrap();
    let reference = depth_bin::list_frames(&reference_dir.0, BIN_EXTENSION).unwrap();
    let pairs = depth_bin::pair_frames(&predicted, &reference, config.reference_offset);
    assert_eq!(pairs.len(), 3);

    let summary = eval::evaluate_sequence(&pairs, &config);
    let names: Vec<_> = summary
        .frames
        .iter()
        .map(|m| (m.predicted.as_str(), m.reference.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("depthData0.bin", "depthData1.bin"),
            ("depthData1.bin", "depthData2.bin")
        ]
    );
    assert!(approx::abs_diff_eq!(summary.frames[0].ssim, 1.0, epsilon = 1e-9));
    assert_eq!(summary.frames[0].psnr, f64::INFINITY);
    assert!(summary.frames[1].ssim < 1.0);
    assert!(summary.frames[1].psnr.is_finite());
    assert_eq!(summary.mean_psnr(), Some(f64::INFINITY));
}

#[test]
fn converted_pictures_are_compared_by_name() {
    let predict_dir = TempDir::new("predict_png");
    let reference_dir = TempDir::new("reference_png");
    for index in 0..3 {
        write_frame(&predict_dir.0, index, &frame_values(index));
    }
    write_frame(&reference_dir.0, 1, &frame_values(1));
    write_frame(&reference_dir.0, 2, &frame_values(5));
    write_frame(&reference_dir.0, 3, &frame_values(3)[..7]);

    let config = Config {
        window_size: 5,
        width: WIDTH,
        height: HEIGHT,
        ..Config::gray()
    };
    let predicted = depth_bin::list_frames(&predict_dir.0, BIN_EXTENSION).unwrap();
    let reference = depth_bin::list_frames(&reference_dir.0, BIN_EXTENSION).unwrap();
    assert_eq!(eval::convert_sequence(&predicted, &config), 3);
    assert_eq!(eval::convert_sequence(&reference, &config), 2);
    let pngs = depth_bin::list_frames(&reference_dir.0, PNG_EXTENSION).unwrap();
    assert_eq!(pngs.iter().map(|f| f.index).collect::<Vec<_>>(), vec![1, 2]);

    let summary = eval::evaluate_pictures(&predict_dir.0, &reference_dir.0, 5).unwrap();
    assert_eq!(summary.frames.len(), 2);
    assert_eq!(summary.frames[0].predicted, "depthData1.png");
    assert!(approx::abs_diff_eq!(summary.frames[0].ssim, 1.0, epsilon = 1e-9));
    assert_eq!(summary.frames[0].psnr, f64::INFINITY);
    assert!(summary.frames[1].ssim < 1.0);
}

#[test]
fn missing_directory_is_an_error() {
    let dir = std::env::temp_dir().join("depth_eval_missing_dir_for_tests");
    assert!(eval::evaluate_pictures(&dir, &dir, 5).is_err());
    assert!(depth_bin::list_frames(&dir, BIN_EXTENSION).is_err());
}
