//! Debug observation of intermediate pipeline images.
//!
//! The pipeline hands every intermediate image to a [`StageObserver`]. The
//! default observer discards them, keeping production runs free of debug
//! cost; the directory observer saves them for inspection. Observation is an
//! injected collaborator, never a build-time toggle.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{GrayImage, RgbImage};
use tracing::warn;

use crate::core::MrzResult;

/// Receives named intermediate images from the pipeline.
///
/// All methods default to no-ops; implementations override what they need.
/// Expensive renderings (overlays) are only produced when [`enabled`]
/// returns true.
///
/// [`enabled`]: StageObserver::enabled
pub trait StageObserver: Send + Sync {
    /// Whether the pipeline should spend time producing optional images.
    fn enabled(&self) -> bool {
        false
    }

    /// Receives a single-channel intermediate image.
    fn stage(&self, name: &str, image: &GrayImage) {
        let _ = (name, image);
    }

    /// Receives a rendered color overlay.
    fn overlay(&self, name: &str, image: &RgbImage) {
        let _ = (name, image);
    }
}

/// The default observer: discards everything.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {}

/// Saves every observed image as a PNG in a directory, numbered in arrival
/// order. Save failures are logged, never propagated; observation must not
/// affect pipeline outcomes.
#[derive(Debug)]
pub struct DirectoryObserver {
    dir: PathBuf,
    counter: AtomicUsize,
}

impl DirectoryObserver {
    /// Creates the observer, creating `dir` if needed.
    pub fn new(dir: PathBuf) -> MrzResult<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            counter: AtomicUsize::new(0),
        })
    }

    fn target(&self, name: &str) -> PathBuf {
        let index = self.counter.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!("{index:03}-{name}.png"))
    }
}

impl StageObserver for DirectoryObserver {
    fn enabled(&self) -> bool {
        true
    }

    fn stage(&self, name: &str, image: &GrayImage) {
        let path = self.target(name);
        if let Err(error) = image.save(&path) {
            warn!(path = %path.display(), %error, "failed to save stage image");
        }
    }

    fn overlay(&self, name: &str, image: &RgbImage) {
        let path = self.target(name);
        if let Err(error) = image.save(&path) {
            warn!(path = %path.display(), %error, "failed to save overlay image");
        }
    }
}
