//! Pixel format modes.
//!
//! A mode index 0-7 selects one of eight RGB565 variants. Bit 0 picks the
//! channel order, bit 1 the green packing and bit 2 the polarity, so modes 4-7
//! are the inverted counterparts of modes 0-3.

use crate::{Error, Result};
use std::str::FromStr;

/// Which 8-bit channel lands in the high 5-bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Red in bits 11-15, blue in bits 0-4.
    Rgb,
    /// Blue in bits 11-15, red in bits 0-4.
    Bgr,
}

/// Green field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packing {
    /// True RGB565: 6-bit green at bit 5.
    Standard,
    /// Non-standard: 5-bit green at bit 6, bit 5 left clear.
    Compact,
}

/// Whether the packed value is inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Normal,
    /// Stored as `0xFFFF - value`, for panels with black and white swapped.
    Inverted,
}

/// Number of supported modes.
pub const MODE_COUNT: u8 = 8;

const TABLE: [(ChannelOrder, Packing, Polarity); MODE_COUNT as usize] = [
    (ChannelOrder::Rgb, Packing::Standard, Polarity::Normal),
    (ChannelOrder::Bgr, Packing::Standard, Polarity::Normal),
    (ChannelOrder::Rgb, Packing::Compact, Polarity::Normal),
    (ChannelOrder::Bgr, Packing::Compact, Polarity::Normal),
    (ChannelOrder::Rgb, Packing::Standard, Polarity::Inverted),
    (ChannelOrder::Bgr, Packing::Standard, Polarity::Inverted),
    (ChannelOrder::Rgb, Packing::Compact, Polarity::Inverted),
    (ChannelOrder::Bgr, Packing::Compact, Polarity::Inverted),
];

/// One of the eight RGB565 variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mode(u8);

impl Mode {
    /// Creates a mode from its index.
    pub fn new(index: u8) -> Result<Self> {
        if index < MODE_COUNT {
            Ok(Mode(index))
        } else {
            Err(Error::InvalidMode(index.to_string()))
        }
    }

    /// Returns all eight modes in index order.
    pub fn all() -> impl Iterator<Item = Mode> {
        (0..MODE_COUNT).map(Mode)
    }

    /// Returns the mode index.
    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn channel_order(&self) -> ChannelOrder {
        TABLE[self.0 as usize].0
    }

    pub fn packing(&self) -> Packing {
        TABLE[self.0 as usize].1
    }

    pub fn polarity(&self) -> Polarity {
        TABLE[self.0 as usize].2
    }

    /// Returns the normal-polarity mode with the same order and packing.
    pub fn base(&self) -> Mode {
        Mode(self.0 % 4)
    }

    /// Returns the directory name used for this mode's output.
    pub fn dir_name(&self) -> String {
        format!("mode_{}", self.0)
    }

    /// Returns a human-readable description, e.g. "Compact BGR565 (inverted)".
    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "Standard RGB565 (normal)",
            1 => "Standard BGR565 (normal)",
            2 => "Compact RGB565 (normal)",
            3 => "Compact BGR565 (normal)",
            4 => "Standard RGB565 (inverted)",
            5 => "Standard BGR565 (inverted)",
            6 => "Compact RGB565 (inverted)",
            _ => "Compact BGR565 (inverted)",
        }
    }

    /// Returns the bit layout, e.g. "R(5)<<11 | G(6)<<5 | B(5)".
    pub fn layout(&self) -> &'static str {
        match (self.channel_order(), self.packing()) {
            (ChannelOrder::Rgb, Packing::Standard) => "R(5)<<11 | G(6)<<5 | B(5)",
            (ChannelOrder::Bgr, Packing::Standard) => "B(5)<<11 | G(6)<<5 | R(5)",
            (ChannelOrder::Rgb, Packing::Compact) => "R(5)<<11 | G(5)<<6 | B(5)",
            (ChannelOrder::Bgr, Packing::Compact) => "B(5)<<11 | G(5)<<6 | R(5)",
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self> {
        Mode::new(index)
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("mode_")
            .or_else(|| trimmed.strip_prefix("mode"))
            .unwrap_or(trimmed);
        digits
            .parse::<u8>()
            .ok()
            .and_then(|index| Mode::new(index).ok())
            .ok_or_else(|| Error::InvalidMode(s.to_string()))
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a comma-separated mode list such as "0,1,4". Duplicates are dropped
/// and the result is sorted.
pub fn parse_mode_list(s: &str) -> Result<Vec<Mode>> {
    let mut modes = s
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Mode>>>()?;
    modes.sort();
    modes.dedup();
    if modes.is_empty() {
        return Err(Error::InvalidMode(s.to_string()));
    }
    Ok(modes)
}
