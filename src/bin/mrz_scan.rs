//! MRZ Scanning
//!
//! Scans document photographs for a machine-readable zone and prints the
//! transcription of each. Images that yield no MRZ are reported and
//! skipped; the batch always runs to completion.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin mrz-scan -- -m training.data passport1.jpg passport2.jpg
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use mrz_ocr::prelude::*;
use mrz_ocr::utils::init_tracing;

/// Command-line arguments for MRZ scanning.
#[derive(Parser)]
#[command(name = "mrz-scan")]
#[command(about = "Locate and transcribe the machine-readable zone of document images")]
struct Args {
    /// Trained recogniser model
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// JSON scanner configuration; explicit flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory that receives intermediate debug images
    #[arg(short, long)]
    debug_dir: Option<PathBuf>,

    /// Document images to scan
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ScannerConfig::from_file(path)?,
        None => ScannerConfig::new(PathBuf::from("training.data")),
    };
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(dir) = args.debug_dir {
        config.debug_dir = Some(dir);
    }

    let scanner = MrzScanner::from_config(&config)?;
    info!(images = args.images.len(), "scanning batch");

    let outcomes = scanner.scan_batch(&args.images)?;
    for outcome in &outcomes {
        match &outcome.scan {
            Some(scan) => {
                println!(
                    "{}: {} (confidence {:.2})",
                    outcome.path.display(),
                    scan.layout,
                    scan.confidence()
                );
                for line in &scan.lines {
                    println!("  {line}");
                }
            }
            None => println!("{}: no MRZ found", outcome.path.display()),
        }
    }
    Ok(())
}
