//! Diagnostic test pattern.
//!
//! Red, green and blue vertical stripes across the width, with the right half
//! overdrawn by a black-to-white ramp. A correctly configured panel shows pure
//! primaries on the left and a smooth, non-inverted gradient on the right.

use image::{Rgb, RgbImage};

/// Generates the test pattern at the given size.
pub fn test_pattern(width: u32, height: u32) -> RgbImage {
    let half = width / 2;
    RgbImage::from_fn(width, height, |x, _y| {
        if x >= half {
            let gray = (255 * (x - half) / (width - half)) as u8;
            return Rgb([gray, gray, gray]);
        }
        match (x as u64 * 3) / width as u64 {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        }
    })
}
