//! Utility functions for the MRZ pipeline.
//!
//! Image loading, logging setup, debug observation and visualization.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};

use crate::core::{MrzError, MrzResult};

pub mod observer;
pub mod visualization;

pub use observer::{DirectoryObserver, NoopObserver, StageObserver};
pub use visualization::segmentation_overlay;

/// Loads an image from a file and converts it to RGB.
pub fn load_image(path: &Path) -> MrzResult<RgbImage> {
    let img = image::open(path).map_err(MrzError::ImageLoad)?;
    Ok(img.to_rgb8())
}

/// Loads an image from a file and converts it to greyscale.
pub fn load_grey_image(path: &Path) -> MrzResult<GrayImage> {
    let img = image::open(path).map_err(MrzError::ImageLoad)?;
    Ok(img.to_luma8())
}

/// Converts a DynamicImage to a GrayImage.
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Initializes the tracing subscriber for logging.
///
/// Sets up the subscriber with an environment filter and a formatting
/// layer. Typically called once at the start of a binary.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
