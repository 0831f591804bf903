//! Core types shared by every stage of the MRZ pipeline.
//!
//! This module contains:
//! - Tuning constants for localization, segmentation and recognition
//! - Error handling
//! - Geometric primitives

pub mod constants;
pub mod errors;
pub mod geometry;

pub use constants::*;
pub use errors::{MrzError, MrzResult};
pub use geometry::{contour_area, Rect};
