//! # MRZ OCR
//!
//! A Rust library that locates and transcribes the Machine-Readable Zone
//! (MRZ) of travel documents from photographs or scans, using classical
//! computer vision throughout: morphological band localization, contour
//! based character segmentation with joint TD1/TD3 layout classification,
//! and a case-based nearest-neighbour character recogniser.
//!
//! ## Pipeline
//!
//! 1. **Locate**: rescale the photo to a canonical height, emphasise small
//!    dark text with a blackhat filter, and fuse character strokes into a
//!    wide band selected by its geometry.
//! 2. **Segment**: binarize the band, strip residual borders, extract
//!    character-sized contours, and score the TD1 (3 lines of 30) and TD3
//!    (2 lines of 44) layout hypotheses against the candidate geometry.
//! 3. **Recognise**: normalize each character cell to a 14x14 binary sample
//!    and classify it by nearest-neighbour search over the trained case
//!    base, with rejection for distant glyphs.
//!
//! Per-image failures (no band found, layout indeterminate) are reported to
//! the caller and never abort a batch.
//!
//! ## Modules
//!
//! * [`core`] - Constants, error handling, and geometric primitives
//! * [`domain`] - MRZ layout types
//! * [`processors`] - Band localization and character segmentation
//! * [`recognition`] - Recogniser engines and training helpers
//! * [`pipeline`] - Scanner orchestration and configuration
//! * [`utils`] - Image loading, logging setup, and debug observation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mrz_ocr::prelude::*;
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScannerConfig::new(PathBuf::from("training.data"));
//! let scanner = MrzScanner::from_config(&config)?;
//!
//! let image = load_image(Path::new("passport.jpg"))?;
//! match scanner.scan(&image) {
//!     Ok(scan) => println!("{} {}", scan.layout, scan.text()),
//!     Err(e) if e.is_per_image() => eprintln!("no MRZ: {e}"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod recognition;
pub mod utils;

pub use crate::core::{MrzError, MrzResult};
pub use crate::domain::MrzLayout;

/// Prelude module for convenient imports.
///
/// Brings the essentials into scope:
/// - The scanning pipeline (`MrzScanner`, `MrzScan`, `ScannerConfig`)
/// - Error types (`MrzError`, `MrzResult`)
/// - Layout classification (`MrzLayout`)
/// - Basic image loading (`load_image`)
///
/// For training and engine customization, import from
/// [`crate::recognition`] directly.
pub mod prelude {
    pub use crate::core::{MrzError, MrzResult};
    pub use crate::domain::MrzLayout;
    pub use crate::pipeline::{BatchOutcome, MrzScan, MrzScanner, RecogniserKind, ScannerConfig};
    pub use crate::utils::load_image;
}
