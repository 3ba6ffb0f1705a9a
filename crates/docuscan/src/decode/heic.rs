//! HEIC/HEIF decoding via libheif.
//!
//! Only the primary image of the container is decoded. It is read in its native layout
//! (RGB or RGBA depending on whether the image carries an alpha channel) and normalized to
//! RGB by the caller.
//!
//! Requires the `heic` feature and a system libheif. Without the feature every HEIC input
//! fails with a `Decode` error.

use std::path::Path;

use super::PageImage;
use crate::{DocuscanError, Result};

#[cfg(feature = "heic")]
pub fn decode_heic(path: &Path) -> Result<PageImage> {
    use image::{DynamicImage, RgbImage, RgbaImage};
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let path_str = path
        .to_str()
        .ok_or_else(|| DocuscanError::decode(format!("Non UTF-8 path: {}", path.display())))?;

    let lib_heif = LibHeif::new();
    let context = HeifContext::read_from_file(path_str)
        .map_err(|e| DocuscanError::decode_with_source(format!("Failed to read HEIC/HEIF {}", path.display()), e))?;
    let handle = context
        .primary_image_handle()
        .map_err(|e| DocuscanError::decode_with_source("HEIC/HEIF file has no primary image", e))?;

    let has_alpha = handle.has_alpha_channel();
    let chroma = if has_alpha { RgbChroma::Rgba } else { RgbChroma::Rgb };
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(chroma), None)
        .map_err(|e| DocuscanError::decode_with_source("Failed to decode HEIC/HEIF image", e))?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| DocuscanError::decode("HEIC/HEIF image has no interleaved plane"))?;

    let channels: usize = if has_alpha { 4 } else { 3 };
    let width = plane.width;
    let height = plane.height;
    let row_len = width as usize * channels;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        let row = row
            .get(..row_len)
            .ok_or_else(|| DocuscanError::decode("HEIC/HEIF plane row is shorter than its width"))?;
        pixels.extend_from_slice(row);
    }

    let image = if has_alpha {
        RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    }
    .ok_or_else(|| DocuscanError::decode("HEIC/HEIF pixel buffer does not match its dimensions"))?;

    tracing::debug!(width, height, has_alpha, "Decoded HEIC/HEIF primary image");

    Ok(PageImage::new(image))
}

#[cfg(not(feature = "heic"))]
pub fn decode_heic(path: &Path) -> Result<PageImage> {
    Err(DocuscanError::decode(format!(
        "Cannot decode {}: HEIC/HEIF support is not enabled (build with the `heic` feature)",
        path.display()
    )))
}
