//! RGB565 pixel encoder and RAW buffers.

use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};

use crate::mode::{ChannelOrder, Mode, Packing, Polarity};
use crate::{prepare, Error, Result};

/// Bytes per encoded pixel.
pub const BYTES_PER_PIXEL: usize = 2;

/// Packs an 8-bit RGB triple into a 16-bit value for the given mode.
#[inline]
pub fn encode_pixel(r: u8, g: u8, b: u8, mode: Mode) -> u16 {
    let (high, low) = match mode.channel_order() {
        ChannelOrder::Rgb => (r, b),
        ChannelOrder::Bgr => (b, r),
    };
    let high5 = (high >> 3) as u16;
    let low5 = (low >> 3) as u16;
    let pixel = match mode.packing() {
        Packing::Standard => (high5 << 11) | (((g >> 2) as u16) << 5) | low5,
        Packing::Compact => (high5 << 11) | (((g >> 3) as u16) << 6) | low5,
    };
    match mode.polarity() {
        Polarity::Normal => pixel,
        Polarity::Inverted => 0xFFFF - pixel,
    }
}

/// Unpacks a 16-bit value written under `mode` back to 8-bit RGB.
///
/// Fields are widened by bit replication, so this is the inverse of
/// [`encode_pixel`] up to quantization.
#[inline]
pub fn decode_pixel(value: u16, mode: Mode) -> (u8, u8, u8) {
    let pixel = match mode.polarity() {
        Polarity::Normal => value,
        Polarity::Inverted => 0xFFFF - value,
    };
    let high = expand5(((pixel >> 11) & 0x1F) as u8);
    let low = expand5((pixel & 0x1F) as u8);
    let g = match mode.packing() {
        Packing::Standard => {
            let g6 = ((pixel >> 5) & 0x3F) as u8;
            (g6 << 2) | (g6 >> 4)
        }
        Packing::Compact => expand5(((pixel >> 6) & 0x1F) as u8),
    };
    match mode.channel_order() {
        ChannelOrder::Rgb => (high, g, low),
        ChannelOrder::Bgr => (low, g, high),
    }
}

#[inline]
fn expand5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

/// Encodes an RGB image row by row, each pixel written low byte first.
pub fn encode_image(image: &RgbImage, mode: Mode) -> RawBuffer {
    let (width, height) = image.dimensions();
    let mut data = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
    for &Rgb([r, g, b]) in image.pixels() {
        data.extend_from_slice(&encode_pixel(r, g, b, mode).to_le_bytes());
    }
    RawBuffer {
        width,
        height,
        data,
    }
}

/// Prepares an already decoded image and encodes it.
pub fn convert_image(
    image: &DynamicImage,
    width: u32,
    height: u32,
    mode: Mode,
) -> Result<RawBuffer> {
    let prepared = prepare::prepare(image, width, height)?;
    Ok(encode_image(&prepared, mode))
}

/// Decodes an image file, fits it to `width` x `height` and encodes it.
pub fn convert_to_raw<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    mode: Mode,
) -> Result<RawBuffer> {
    let image = prepare::open_image(path)?;
    convert_image(&image, width, height, mode)
}

/// Flat little-endian RGB565 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBuffer {
    width: u32,
    height: u32,
    /// Two bytes per pixel, row-major.
    data: Vec<u8>,
}

impl RawBuffer {
    /// Wraps existing RAW bytes, checking the length against the dimensions.
    pub fn from_bytes(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Reads a RAW file from disk.
    pub fn load<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(width, height, data)
    }

    /// Writes the buffer to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns the byte length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets the 16-bit value at the given coordinates.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u16> {
        if x < self.width && y < self.height {
            let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
            Some(u16::from_le_bytes([self.data[idx], self.data[idx + 1]]))
        } else {
            None
        }
    }

    /// Iterates over the 16-bit pixel values in scan order.
    pub fn pixels(&self) -> impl Iterator<Item = u16> + '_ {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Renders the buffer as it would look if the panel interpreted it under `mode`.
    pub fn to_rgb_image(&self, mode: Mode) -> Result<RgbImage> {
        let mut rgb = Vec::with_capacity(self.data.len() / BYTES_PER_PIXEL * 3);
        for pixel in self.pixels() {
            let (r, g, b) = decode_pixel(pixel, mode);
            rgb.push(r);
            rgb.push(g);
            rgb.push(b);
        }
        let actual = rgb.len() / 3 * BYTES_PER_PIXEL;
        RgbImage::from_raw(self.width, self.height, rgb).ok_or(Error::BufferSize {
            expected: self.width as usize * self.height as usize * BYTES_PER_PIXEL,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(index: u8) -> Mode {
        Mode::new(index).unwrap()
    }

    #[test]
    fn test_standard_rgb565() {
        assert_eq!(encode_pixel(255, 0, 0, mode(0)), 0xF800);
        assert_eq!(encode_pixel(0, 255, 0, mode(0)), 0x07E0);
        assert_eq!(encode_pixel(0, 0, 255, mode(0)), 0x001F);
        assert_eq!(encode_pixel(255, 255, 255, mode(0)), 0xFFFF);
        assert_eq!(encode_pixel(0, 0, 0, mode(0)), 0x0000);
    }

    #[test]
    fn test_bgr_swaps_outer_fields() {
        assert_eq!(encode_pixel(255, 0, 0, mode(1)), 0x001F);
        assert_eq!(encode_pixel(0, 0, 255, mode(1)), 0xF800);
        assert_eq!(encode_pixel(0, 255, 0, mode(1)), 0x07E0);
    }

    #[test]
    fn test_compact_green() {
        // 5-bit green at bit 6; bit 5 never set.
        assert_eq!(encode_pixel(0, 255, 0, mode(2)), 0x07C0);
        assert_eq!(encode_pixel(0, 255, 0, mode(3)), 0x07C0);
        assert_eq!(encode_pixel(255, 255, 255, mode(2)), 0xFFDF);
        assert_eq!(encode_pixel(255, 0, 0, mode(3)), 0x001F);
    }

    #[test]
    fn test_inverted() {
        assert_eq!(encode_pixel(255, 0, 0, mode(4)), 0x07FF);
        assert_eq!(encode_pixel(0, 0, 0, mode(4)), 0xFFFF);
        assert_eq!(encode_pixel(255, 255, 255, mode(6)), 0x0020);
    }

    #[test]
    fn test_red_2x1_bytes() {
        let image = RgbImage::from_pixel(2, 1, Rgb([255, 0, 0]));
        assert_eq!(
            encode_image(&image, mode(0)).as_bytes(),
            &[0x00, 0xF8, 0x00, 0xF8]
        );
        assert_eq!(
            encode_image(&image, mode(4)).as_bytes(),
            &[0xFF, 0x07, 0xFF, 0x07]
        );
    }

    #[test]
    fn test_scan_order() {
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(1, 0, Rgb([255, 0, 0]));
        image.put_pixel(0, 1, Rgb([0, 0, 255]));
        let raw = encode_image(&image, mode(0));
        let pixels: Vec<u16> = raw.pixels().collect();
        assert_eq!(pixels, vec![0x0000, 0xF800, 0x001F, 0x0000]);
        assert_eq!(raw.get_pixel(1, 0), Some(0xF800));
        assert_eq!(raw.get_pixel(2, 0), None);
    }

    #[test]
    fn test_convert_image_resizes() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([0, 255, 0])));
        let raw = convert_image(&source, 6, 5, mode(0)).unwrap();
        assert_eq!(raw.width(), 6);
        assert_eq!(raw.height(), 5);
        assert_eq!(raw.len(), 6 * 5 * 2);
        assert!(raw.pixels().all(|p| p == 0x07E0));
    }

    #[test]
    fn test_convert_image_rejects_zero_dimensions() {
        let source = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert!(matches!(
            convert_image(&source, 0, 2, mode(0)),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_convert_to_raw_missing_file() {
        let result = convert_to_raw("/nonexistent/panel-probe/missing.png", 2, 2, mode(0));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_convert_to_raw_jpeg_with_png_extension() {
        let path = std::env::temp_dir().join(format!(
            "panel-probe-encoder-{}-photo.png",
            std::process::id()
        ));
        RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]))
            .save_with_format(&path, image::ImageFormat::Jpeg)
            .unwrap();
        let result = convert_to_raw(&path, 2, 2, mode(0));
        let _ = std::fs::remove_file(&path);

        let raw = result.unwrap();
        assert_eq!(raw.len(), 2 * 2 * 2);
        // Red field saturated, blue field empty.
        let pixel = raw.get_pixel(0, 0).unwrap();
        assert!(pixel >> 11 >= 30);
        assert!(pixel & 0x1F <= 1);
    }

    #[test]
    fn test_from_bytes_checks_length() {
        assert!(RawBuffer::from_bytes(2, 2, vec![0; 8]).is_ok());
        assert!(matches!(
            RawBuffer::from_bytes(2, 2, vec![0; 7]),
            Err(Error::BufferSize {
                expected: 8,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_decode_primaries() {
        assert_eq!(decode_pixel(0xF800, mode(0)), (255, 0, 0));
        assert_eq!(decode_pixel(0xF800, mode(1)), (0, 0, 255));
        assert_eq!(decode_pixel(0x07FF, mode(4)), (255, 0, 0));
        assert_eq!(decode_pixel(0x07C0, mode(2)), (0, 255, 0));
    }

    #[test]
    fn test_to_rgb_image() {
        let raw = RawBuffer::from_bytes(2, 1, vec![0x00, 0xF8, 0x1F, 0x00]).unwrap();
        let image = raw.to_rgb_image(mode(0)).unwrap();
        assert_eq!(image.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_to_rgb_image_reports_broken_length() {
        let raw = RawBuffer {
            width: 2,
            height: 2,
            data: vec![0; 6],
        };
        assert!(matches!(
            raw.to_rgb_image(mode(0)),
            Err(Error::BufferSize {
                expected: 8,
                actual: 6
            })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn mode_strategy() -> impl Strategy<Value = Mode> {
        (0u8..8).prop_map(|i| Mode::new(i).unwrap())
    }

    fn quantize(v: u8, bits: u32) -> u8 {
        let q = v >> (8 - bits);
        (q << (8 - bits)) | (q >> (2 * bits - 8))
    }

    proptest! {
        /// Mode 0 is true RGB565.
        #[test]
        fn prop_mode0_is_rgb565(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let expected = ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3);
            prop_assert_eq!(encode_pixel(r, g, b, Mode::new(0).unwrap()), expected);
        }

        /// Modes 4-7 are 0xFFFF minus their normal counterparts.
        #[test]
        fn prop_inverted_complements_base(
            r in any::<u8>(),
            g in any::<u8>(),
            b in any::<u8>(),
            base in 0u8..4,
        ) {
            let normal = encode_pixel(r, g, b, Mode::new(base).unwrap());
            let inverted = encode_pixel(r, g, b, Mode::new(base + 4).unwrap());
            prop_assert_eq!(inverted, 0xFFFF - normal);
        }

        /// Output is always width * height * 2 bytes, little-endian per pixel.
        #[test]
        fn prop_buffer_shape_and_byte_order(
            (width, height) in (1u32..=16, 1u32..=16),
            mode in mode_strategy(),
            seed in any::<u8>(),
        ) {
            let image = RgbImage::from_fn(width, height, |x, y| {
                Rgb([seed.wrapping_add(x as u8), seed ^ (y as u8), (x * y) as u8])
            });
            let raw = encode_image(&image, mode);
            prop_assert_eq!(raw.len(), width as usize * height as usize * 2);
            for (i, p) in image.pixels().enumerate() {
                let v = encode_pixel(p[0], p[1], p[2], mode);
                prop_assert_eq!(raw.as_bytes()[i * 2], (v & 0xFF) as u8);
                prop_assert_eq!(raw.as_bytes()[i * 2 + 1], ((v >> 8) & 0xFF) as u8);
            }
        }

        /// Decoding recovers the color up to field quantization.
        #[test]
        fn prop_decode_inverts_encode(
            r in any::<u8>(),
            g in any::<u8>(),
            b in any::<u8>(),
            mode in mode_strategy(),
        ) {
            let green_bits = match mode.packing() {
                Packing::Standard => 6,
                Packing::Compact => 5,
            };
            let decoded = decode_pixel(encode_pixel(r, g, b, mode), mode);
            prop_assert_eq!(decoded, (quantize(r, 5), quantize(g, green_bits), quantize(b, 5)));
        }

        /// Same input always produces the same bytes.
        #[test]
        fn prop_deterministic(
            (width, height) in (1u32..=8, 1u32..=8),
            mode in mode_strategy(),
        ) {
            let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8 * 30, y as u8 * 30, 77]));
            prop_assert_eq!(encode_image(&image, mode), encode_image(&image, mode));
        }
    }
}
