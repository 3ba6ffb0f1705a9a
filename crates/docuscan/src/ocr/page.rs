//! The single-page pipeline: detect, crop, recognize, reassemble.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use image::RgbImage;

use super::OcrEngine;
use super::geometry::{Quad, crop};
use super::reading_order::reading_order_text;
use crate::types::{PageOcr, TextRegion};
use crate::{DocuscanError, Result};

impl OcrEngine {
    /// Run detection and recognition over the page image at `path`.
    ///
    /// Regions come back in detector order; degenerate boxes are left out. A region whose
    /// recognition fails keeps its box and gets empty text.
    ///
    /// # Errors
    ///
    /// - `ImageRead` if the page cannot be opened or decoded
    /// - `Detection` if the detector fails
    pub fn run_page(&self, path: &Path) -> Result<PageOcr> {
        let image = image::open(path)
            .map_err(|e| DocuscanError::image_read(path, "cannot decode page image", Some(e)))?
            .into_rgb8();
        self.run_image(&image)
    }

    /// Same as [`run_page`](Self::run_page) for an image already in memory.
    pub fn run_image(&self, image: &RgbImage) -> Result<PageOcr> {
        let quads = self.detector().detect(image).map_err(into_detection_error)?;
        tracing::debug!(detections = quads.len(), "Detected text regions");

        let mut regions = Vec::with_capacity(quads.len());
        for quad in quads {
            let Some(region) = crop(image, &quad) else {
                tracing::debug!(bbox = ?quad.points, "Skipping degenerate region");
                continue;
            };
            let text = self.recognize_region(&region, &quad);
            regions.push(TextRegion::new(quad, text));
        }

        let full_text = reading_order_text(&regions);
        Ok(PageOcr { regions, full_text })
    }

    fn recognize_region(&self, region: &RgbImage, quad: &Quad) -> String {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.recognizer().recognize(region)));
        match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::debug!(bbox = ?quad.points, "Recognition failed, using empty text: {}", e);
                String::new()
            }
            Err(_) => {
                tracing::debug!(bbox = ?quad.points, "Recognizer panicked, using empty text");
                String::new()
            }
        }
    }
}

fn into_detection_error(err: DocuscanError) -> DocuscanError {
    match err {
        DocuscanError::Detection { .. } => err,
        other => DocuscanError::detection_with_source(other.to_string(), other),
    }
}
