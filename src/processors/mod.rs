//! Image processing stages of the MRZ pipeline.
//!
//! # Modules
//!
//! * `border` - Bounding rectangle of the dominant foreground region
//! * `locate` - MRZ band localization within a document photo
//! * `segment` - Character segmentation and layout classification

pub mod border;
pub mod locate;
pub mod segment;

pub use border::largest_region_rect;
pub use locate::{MrzLocator, MrzRegion};
pub use segment::{CharacterSegmenter, Segmentation};
