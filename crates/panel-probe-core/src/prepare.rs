//! Image preparation: alpha flattening, RGB conversion and exact resize.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, Rgb, RgbImage, RgbaImage};
use tracing::debug;

use crate::{Error, Result};

/// Resampling filter used for all resizes.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Decodes an image file, detecting the format from its leading bytes.
///
/// The extension is only a fallback, so a JPEG saved as `.png` still decodes.
pub fn open_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    reader.decode().map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Normalizes `image` to an opaque RGB bitmap of exactly `width` x `height`.
///
/// Transparent images are composited onto white first. The aspect ratio is
/// not preserved.
pub fn prepare(image: &DynamicImage, width: u32, height: u32) -> Result<RgbImage> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }

    let rgb = if image.color().has_alpha() {
        flatten_alpha(&image.to_rgba8())
    } else {
        image.to_rgb8()
    };

    if rgb.dimensions() == (width, height) {
        return Ok(rgb);
    }

    debug!(
        "Resizing {}x{} -> {}x{}",
        rgb.width(),
        rgb.height(),
        width,
        height
    );
    Ok(image::imageops::resize(&rgb, width, height, RESIZE_FILTER))
}

/// Composites an RGBA image onto an opaque white background.
pub fn flatten_alpha(image: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (dst, src) in out.pixels_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = Rgb([blend_white(r, a), blend_white(g, a), blend_white(b, a)]);
    }
    out
}

#[inline]
fn blend_white(c: u8, a: u8) -> u8 {
    let c = c as u32;
    let a = a as u32;
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}
