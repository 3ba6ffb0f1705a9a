//! Detection and recognition capabilities.
//!
//! The pipeline only ever sees these two traits. A model runtime plugs in by implementing
//! one of them; plain closures already do. Backends that cannot be called concurrently
//! implement [`DetectionModel`] / [`RecognitionModel`] instead and are wrapped in
//! [`Exclusive`], which serializes calls behind a mutex.

use std::path::Path;

use image::RgbImage;
use parking_lot::Mutex;

use super::geometry::Quad;
use crate::{DocuscanError, Result};

/// Finds text regions on a page.
pub trait TextDetector: Send + Sync {
    /// Quadrilaterals for every text region on `image`, in the detector's own order.
    fn detect(&self, image: &RgbImage) -> Result<Vec<Quad>>;

    /// Load the page at `path` and detect on it.
    fn detect_file(&self, path: &Path) -> Result<Vec<Quad>> {
        let image = image::open(path)
            .map_err(|e| DocuscanError::image_read(path, "cannot decode page image", Some(e)))?
            .into_rgb8();
        self.detect(&image)
    }
}

/// Reads the text inside one cropped region.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, crop: &RgbImage) -> Result<String>;
}

impl<F> TextDetector for F
where
    F: Fn(&RgbImage) -> Result<Vec<Quad>> + Send + Sync,
{
    fn detect(&self, image: &RgbImage) -> Result<Vec<Quad>> {
        self(image)
    }
}

impl<F> TextRecognizer for F
where
    F: Fn(&RgbImage) -> Result<String> + Send + Sync,
{
    fn recognize(&self, crop: &RgbImage) -> Result<String> {
        self(crop)
    }
}

/// A detection backend that needs exclusive access while it runs.
pub trait DetectionModel: Send {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Quad>>;
}

/// A recognition backend that needs exclusive access while it runs.
pub trait RecognitionModel: Send {
    fn recognize(&mut self, crop: &RgbImage) -> Result<String>;
}

/// Serializes access to a non-reentrant model.
///
/// ```rust
/// use docuscan::ocr::{DetectionModel, Exclusive, Quad, TextDetector};
/// use image::RgbImage;
///
/// struct Counting(usize);
///
/// impl DetectionModel for Counting {
///     fn detect(&mut self, _image: &RgbImage) -> docuscan::Result<Vec<Quad>> {
///         self.0 += 1;
///         Ok(Vec::new())
///     }
/// }
///
/// let detector = Exclusive::new(Counting(0));
/// detector.detect(&RgbImage::new(1, 1)).unwrap();
/// assert_eq!(detector.into_inner().0, 1);
/// ```
#[derive(Debug, Default)]
pub struct Exclusive<M> {
    model: Mutex<M>,
}

impl<M> Exclusive<M> {
    pub fn new(model: M) -> Self {
        Self { model: Mutex::new(model) }
    }

    pub fn into_inner(self) -> M {
        self.model.into_inner()
    }
}

impl<M: DetectionModel> TextDetector for Exclusive<M> {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Quad>> {
        self.model.lock().detect(image)
    }
}

impl<M: RecognitionModel> TextRecognizer for Exclusive<M> {
    fn recognize(&self, crop: &RgbImage) -> Result<String> {
        self.model.lock().recognize(crop)
    }
}
