//! Panel Probe Core Library
//!
//! Converts images into raw RGB565 pixel buffers in eight variants of channel
//! order, green packing and polarity, so the layout an embedded display
//! actually expects can be found by trial on the hardware.

pub mod encoder;
pub mod error;
pub mod mode;
pub mod pattern;
pub mod prepare;

pub use encoder::{
    convert_image, convert_to_raw, decode_pixel, encode_image, encode_pixel, RawBuffer,
};
pub use error::{Error, Result};
pub use mode::{parse_mode_list, ChannelOrder, Mode, Packing, Polarity, MODE_COUNT};
pub use pattern::test_pattern;
pub use prepare::{flatten_alpha, open_image, prepare};

/// Default target dimensions (240x240 ST7789 panel).
pub const DEFAULT_WIDTH: u32 = 240;
pub const DEFAULT_HEIGHT: u32 = 240;
