//! Generic raster image decoding (PNG, JPEG, WebP, BMP, TIFF, GIF).
//!
//! The format is identified from the file content, not the extension, so a `.jpg` that
//! holds PNG bytes still decodes and a `.jpg` holding garbage is reported as unsupported.

use std::io::Cursor;
use std::path::Path;

use image::{ImageError, ImageReader};

use super::PageImage;
use crate::{DocuscanError, Result};

/// Read and decode the raster image at `path`, normalized to RGB.
pub fn decode_raster(path: &Path) -> Result<PageImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| DocuscanError::decode_with_source(format!("Failed to read {}", path.display()), e))?;

    decode_raster_bytes(&bytes).map_err(|err| match err {
        DocuscanError::UnsupportedFormat { message } => {
            DocuscanError::unsupported_format(format!("{}: {}", path.display(), message))
        }
        other => other,
    })
}

/// Decode raster image bytes, normalized to RGB.
///
/// # Errors
///
/// - `UnsupportedFormat` if the bytes do not match any known raster signature, or the
///   format is recognized but not compiled in
/// - `Decode` if the format was identified but the data is corrupt
pub fn decode_raster_bytes(bytes: &[u8]) -> Result<PageImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DocuscanError::decode_with_source("Failed to read image header", e))?;

    let Some(format) = reader.format() else {
        return Err(DocuscanError::unsupported_format("cannot identify image format"));
    };

    let image = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(unsupported) => {
            DocuscanError::unsupported_format(format!("{:?} images are not supported: {}", format, unsupported))
        }
        other => DocuscanError::decode_with_source(format!("Failed to decode {:?} image", format), other),
    })?;

    tracing::debug!(
        format = ?format,
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Decoded raster image"
    );

    Ok(PageImage::new(image).normalized())
}
