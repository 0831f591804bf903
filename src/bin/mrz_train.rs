//! Recogniser Training
//!
//! Trains the nearest-neighbour recogniser from a glyph strip image that
//! shows every MRZ character in charset order, and saves the model.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin mrz-train -- ocrb.png -o training.data
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use mrz_ocr::core::MRZ_CHARSET;
use mrz_ocr::recognition::{learn_strip, NearestNeighbourRecogniser, Recogniser};
use mrz_ocr::utils::{init_tracing, load_grey_image};

/// Command-line arguments for recogniser training.
#[derive(Parser)]
#[command(name = "mrz-train")]
#[command(about = "Train the MRZ character recogniser from a glyph strip image")]
struct Args {
    /// Glyph strip image containing the MRZ charset in order
    strip: PathBuf,

    /// Where to write the trained model
    #[arg(short, long, default_value = "training.data")]
    output: PathBuf,

    /// Window width in pixels
    #[arg(long, default_value_t = 70)]
    window_width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 115)]
    window_height: u32,

    /// Horizontal offset between consecutive windows
    #[arg(long, default_value_t = 72)]
    step: i64,

    /// Glyphs are dark on a light background
    #[arg(long)]
    dark_on_light: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let strip = load_grey_image(&args.strip)?;
    let mut recogniser = NearestNeighbourRecogniser::new();
    let learned = learn_strip(
        &mut recogniser,
        &strip,
        MRZ_CHARSET,
        (args.window_width, args.window_height),
        (args.step, 0),
        args.dark_on_light,
    )?;
    recogniser.save(&args.output)?;

    info!(
        learned,
        model = %args.output.display(),
        "training complete"
    );
    Ok(())
}
