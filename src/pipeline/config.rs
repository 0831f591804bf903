//! Scanner configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{MrzError, MrzResult};
use crate::recognition::{NearestNeighbourRecogniser, Recogniser};

/// Selects the character recognition engine.
///
/// Engines share the [`Recogniser`] capability set, so the choice is a
/// configuration value rather than a compile-time decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecogniserKind {
    /// Case-based nearest-neighbour recognition.
    #[default]
    NearestNeighbour,
}

impl RecogniserKind {
    /// Builds an empty engine of this kind.
    pub fn build(self) -> Box<dyn Recogniser> {
        match self {
            RecogniserKind::NearestNeighbour => Box::new(NearestNeighbourRecogniser::new()),
        }
    }
}

/// Configuration for building an [`MrzScanner`].
///
/// [`MrzScanner`]: crate::pipeline::MrzScanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Path to the persisted recogniser model.
    pub model_path: PathBuf,
    /// Recognition engine to use.
    #[serde(default)]
    pub recogniser: RecogniserKind,
    /// Directory receiving intermediate debug images. Debug observation is
    /// disabled when absent.
    #[serde(default)]
    pub debug_dir: Option<PathBuf>,
}

impl ScannerConfig {
    /// Creates a configuration with the default engine and no debug output.
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            recogniser: RecogniserKind::default(),
            debug_dir: None,
        }
    }

    /// Reads a configuration from a JSON file.
    pub fn from_file(path: &Path) -> MrzResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader).map_err(|e| {
            MrzError::invalid_input(format!("scanner config {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let config: ScannerConfig =
            serde_json::from_str(r#"{ "model_path": "training.data" }"#).unwrap();
        assert_eq!(config.model_path, PathBuf::from("training.data"));
        assert_eq!(config.recogniser, RecogniserKind::NearestNeighbour);
        assert!(config.debug_dir.is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let mut config = ScannerConfig::new(PathBuf::from("model.bin"));
        config.debug_dir = Some(PathBuf::from("debug"));
        let json = serde_json::to_string(&config).unwrap();
        let restored: ScannerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.model_path, config.model_path);
        assert_eq!(restored.debug_dir, config.debug_dir);
    }
}
