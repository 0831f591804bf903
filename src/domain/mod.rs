//! Domain types for machine-readable travel documents.

pub mod layout;

pub use layout::MrzLayout;
