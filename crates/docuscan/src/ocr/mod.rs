//! Two-stage OCR over materialized pages.
//!
//! [`OcrEngine`] bundles a [`TextDetector`] and a [`TextRecognizer`]. It is built once per
//! process and cloned into every request; clones share the underlying models.
//!
//! - [`page`] runs detection, cropping and recognition over one page image
//! - [`orchestrator`] runs the page pipeline over a whole [`PageBundle`](crate::storage::PageBundle)
//!   with per-page failure isolation
//!
//! # Example
//!
//! ```rust
//! use docuscan::ocr::{OcrEngine, Quad};
//! use image::{Rgb, RgbImage};
//!
//! let engine = OcrEngine::new(
//!     |_: &RgbImage| -> docuscan::Result<Vec<Quad>> { Ok(vec![Quad::from_rect(0.0, 0.0, 8.0, 8.0)]) },
//!     |_: &RgbImage| -> docuscan::Result<String> { Ok("hello".to_string()) },
//! );
//! let ocr = engine.run_image(&RgbImage::from_pixel(16, 16, Rgb([255, 255, 255])))?;
//! assert_eq!(ocr.full_text, "hello");
//! # Ok::<(), docuscan::DocuscanError>(())
//! ```

pub mod capabilities;
pub mod geometry;
pub mod orchestrator;
pub mod page;
pub mod reading_order;

use std::sync::Arc;

pub use capabilities::{DetectionModel, Exclusive, RecognitionModel, TextDetector, TextRecognizer};
pub use geometry::{CropBox, Point, Quad, crop, crop_box};
pub use reading_order::reading_order_text;

/// Shared detection and recognition capabilities.
#[derive(Clone)]
pub struct OcrEngine {
    detector: Arc<dyn TextDetector>,
    recognizer: Arc<dyn TextRecognizer>,
}

impl OcrEngine {
    pub fn new<D, R>(detector: D, recognizer: R) -> Self
    where
        D: TextDetector + 'static,
        R: TextRecognizer + 'static,
    {
        Self::from_shared(Arc::new(detector), Arc::new(recognizer))
    }

    /// Build from models that are already shared elsewhere.
    pub fn from_shared(detector: Arc<dyn TextDetector>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { detector, recognizer }
    }

    pub fn detector(&self) -> &dyn TextDetector {
        self.detector.as_ref()
    }

    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.recognizer.as_ref()
    }
}

impl std::fmt::Debug for OcrEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrEngine").finish_non_exhaustive()
    }
}
