//! MRZ layout types.

use serde::{Deserialize, Serialize};

/// The standardized MRZ layouts this pipeline recognizes.
///
/// The two known layouts carry their printed geometry as data: TD1 identity
/// cards print 3 lines of 30 characters, TD3 passports print 2 lines of 44.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MrzLayout {
    /// Layout not (yet) determined.
    #[default]
    Unknown,
    /// TD1 identity card: 3 lines of 30 characters.
    Td1,
    /// TD3 passport: 2 lines of 44 characters.
    Td3,
}

impl MrzLayout {
    /// The two known layouts, in scoring order.
    pub const KNOWN: [MrzLayout; 2] = [MrzLayout::Td1, MrzLayout::Td3];

    /// Line and character geometry as `(line_count, chars_per_line)`.
    ///
    /// `None` for [`MrzLayout::Unknown`].
    pub fn grid(self) -> Option<(u32, u32)> {
        match self {
            MrzLayout::Unknown => None,
            MrzLayout::Td1 => Some((3, 30)),
            MrzLayout::Td3 => Some((2, 44)),
        }
    }

    /// Number of printed lines, zero for [`MrzLayout::Unknown`].
    pub fn line_count(self) -> u32 {
        self.grid().map_or(0, |(lines, _)| lines)
    }

    /// Characters per printed line, zero for [`MrzLayout::Unknown`].
    pub fn chars_per_line(self) -> u32 {
        self.grid().map_or(0, |(_, chars)| chars)
    }

    /// Total number of character cells, zero for [`MrzLayout::Unknown`].
    pub fn cell_count(self) -> u32 {
        self.line_count() * self.chars_per_line()
    }
}

impl std::fmt::Display for MrzLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MrzLayout::Unknown => write!(f, "unknown"),
            MrzLayout::Td1 => write!(f, "TD1"),
            MrzLayout::Td3 => write!(f, "TD3"),
        }
    }
}
