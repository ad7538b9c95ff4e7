// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{Parser, ValueEnum};
use std::{error::Error, fs::File, path::PathBuf};
use tracing::{error, info, warn};

use depth_eval::dataset::depth_bin::{self, BIN_EXTENSION};
use depth_eval::eval::{self, Config, Input, Summary};
use depth_eval::misc::{interop::GrayScaling, logging};
use depth_eval::video;

/// Compare a predicted depth sequence with a reference depth sequence.
///
/// Predicted frame `depthData<i>.bin` is compared to reference frame
/// `depthData<i+offset>.bin`.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Directory of the predicted depthData<i>.bin frames.
    predict_dir: PathBuf,
    /// Directory of the reference depthData<i>.bin frames.
    reference_dir: PathBuf,
    /// Compare gray images (data range 255) or raw depth values (data range 1).
    #[arg(long, value_enum, default_value_t = Mode::Gray)]
    mode: Mode,
    /// Stretch each frame to its own [min, max] range for the gray images.
    #[arg(long)]
    min_max: bool,
    /// Side length of the SSIM window, odd.
    #[arg(long, default_value_t = depth_eval::core::ssim::DEFAULT_WINDOW_SIZE)]
    window: usize,
    /// Width of the depth frames.
    #[arg(long, default_value_t = depth_bin::DEFAULT_WIDTH)]
    width: usize,
    /// Height of the depth frames.
    #[arg(long, default_value_t = depth_bin::DEFAULT_HEIGHT)]
    height: usize,
    /// Index offset between a predicted frame and its reference frame.
    #[arg(long, default_value_t = depth_bin::DEFAULT_REFERENCE_OFFSET)]
    offset: usize,
    /// Write the per frame metrics to this csv file.
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Do not write the gray png images next to the frames.
    #[arg(long)]
    no_png: bool,
    /// Do not assemble the png images into videos.
    #[arg(long)]
    no_video: bool,
    /// Frame rate of the videos.
    #[arg(long, default_value_t = video::DEFAULT_FPS)]
    fps: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Gray,
    Depth,
}

fn main() {
    let args = Args::parse();
    logging::init();
    if let Err(error) = run(&args) {
        error!("{}", error);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = config_from(args);
    config.validate()?;
    check_dirs(args)?;

    let predicted = depth_bin::list_frames(&args.predict_dir, BIN_EXTENSION)?;
    let reference = depth_bin::list_frames(&args.reference_dir, BIN_EXTENSION)?;
    info!(
        "{} predicted frames, {} reference frames",
        predicted.len(),
        reference.len()
    );

    if !args.no_png {
        eval::convert_sequence(&predicted, &config);
        eval::convert_sequence(&reference, &config);
    }

    let pairs = depth_bin::pair_frames(&predicted, &reference, config.reference_offset);
    let summary = eval::evaluate_sequence(&pairs, &config);
    print_summary(&summary);

    if let Some(csv_path) = &args.csv {
        summary.write_csv(File::create(csv_path)?)?;
        info!("metrics saved to {}", csv_path.display());
    }

    if !args.no_png && !args.no_video {
        for (dir, name) in &[
            (&args.predict_dir, "predict_video.mp4"),
            (&args.reference_dir, "reference_video.mp4"),
        ] {
            // A missing ffmpeg should not discard the metrics.
            if let Err(error) = video::encode_sequence(dir, dir.join(name), args.fps) {
                warn!("no video for {}: {}", dir.display(), error);
            }
        }
    }
    Ok(())
}

fn config_from(args: &Args) -> Config {
    let base = match args.mode {
        Mode::Gray => Config::gray(),
        Mode::Depth => Config::depth(),
    };
    let input = match (args.mode, args.min_max) {
        (Mode::Gray, true) => Input::Gray(GrayScaling::MinMax),
        _ => base.input,
    };
    Config {
        window_size: args.window,
        width: args.width,
        height: args.height,
        reference_offset: args.offset,
        input,
        ..base
    }
}

fn check_dirs(args: &Args) -> Result<(), String> {
    for dir in &[&args.predict_dir, &args.reference_dir] {
        if !dir.is_dir() {
            return Err(format!("Directory does not exist: {}", dir.display()));
        }
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    for m in &summary.frames {
        println!(
            "{} vs {}: SSIM {:.4}, PSNR {:.2} dB",
            m.predicted, m.reference, m.ssim, m.psnr
        );
    }
    match (summary.mean_ssim(), summary.mean_psnr()) {
        (Some(ssim), Some(psnr)) => {
            println!("Average SSIM: {:.4}", ssim);
            println!("Average PSNR: {:.2} dB", psnr);
            println!("{} pairs evaluated", summary.frames.len());
        }
        _ => println!("No pair could be evaluated"),
    }
}
