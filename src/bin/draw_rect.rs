// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use depth_eval::misc::{logging, view};

/// Highlight a region of an image with a red rectangle.
///
/// Coordinates have their origin at the bottom left corner of the image.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Image to annotate.
    input: PathBuf,
    /// Where to save the annotated image.
    output: PathBuf,
    /// Left coordinate.
    x1: u32,
    /// Bottom coordinate.
    y1: u32,
    /// Right coordinate.
    x2: u32,
    /// Top coordinate.
    y2: u32,
}

fn main() {
    let args = Args::parse();
    logging::init();
    match view::annotate_file(&args.input, &args.output, (args.x1, args.y1), (args.x2, args.y2)) {
        Ok(()) => info!("annotated image saved to {}", args.output.display()),
        Err(error) => {
            error!("{}", error);
            std::process::exit(1);
        }
    }
}
