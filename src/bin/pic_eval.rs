// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;
use std::{error::Error, fs::File, path::PathBuf};
use tracing::{error, info};

use depth_eval::eval;
use depth_eval::misc::logging;

/// Compare the png pictures of two directories, matched by file name.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Directory of the predicted pictures.
    predict_dir: PathBuf,
    /// Directory of the reference pictures.
    reference_dir: PathBuf,
    /// Side length of the SSIM window, odd.
    #[arg(long, default_value_t = eval::PICTURE_WINDOW_SIZE)]
    window: usize,
    /// Write the per picture metrics to this csv file.
    #[arg(long)]
    csv: Option<PathBuf>,
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
    let summary = eval::evaluate_pictures(&args.predict_dir, &args.reference_dir, args.window)?;
    for m in &summary.frames {
        println!("{}: SSIM {:.4}, PSNR {:.4}", m.predicted, m.ssim, m.psnr);
    }
    match (summary.mean_ssim(), summary.mean_psnr()) {
        (Some(ssim), Some(psnr)) => {
            println!("{} picture pairs", summary.frames.len());
            println!("Average SSIM: {:.4}", ssim);
            println!("Average PSNR: {:.4}", psnr);
        }
        _ => println!("No picture pair could be evaluated"),
    }
    if let Some(csv_path) = &args.csv {
        summary.write_csv(File::create(csv_path)?)?;
        info!("metrics saved to {}", csv_path.display());
    }
    Ok(())
}
