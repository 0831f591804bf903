//! The end-to-end MRZ scanning pipeline.

pub mod config;
pub mod scanner;

pub use config::{RecogniserKind, ScannerConfig};
pub use scanner::{BatchOutcome, MrzScan, MrzScanner};
