//! PDF page counting and rasterization.
//!
//! Both go through the [`PdfRasterizer`] trait so the page count a ceiling is checked against
//! comes from the same parser that renders the pages. Counting opens the document without
//! rendering anything, so a ceiling is enforced before any bitmap is allocated. The default
//! implementation is [`PdfiumRasterizer`].
//!
//! Pdfium is loaded at runtime. Point `DOCUSCAN_PDFIUM_DIR` at a directory holding the
//! platform library, or install it where the system loader finds it.

pub mod bindings;
pub mod error;
pub mod rendering;

use std::path::Path;

pub use bindings::{PDFIUM_DIR_ENV, pdfium_available};
pub use error::PdfError;
pub use rendering::{DEFAULT_MAX_IMAGE_DIMENSION, PdfiumRasterizer};

use super::PageImage;
use crate::Result;

/// Counts and renders the pages of a PDF, in page order.
///
/// `rasterize` calls `on_page` once per page as soon as the page is rendered and stops at
/// the first error, whether it comes from rendering or from `on_page` itself. Errors from
/// `on_page` must be returned unchanged.
pub trait PdfRasterizer: Send + Sync {
    /// Number of pages `rasterize` would produce, without rendering.
    fn page_count(&self, path: &Path) -> Result<usize>;

    fn rasterize(&self, path: &Path, dpi: u16, on_page: &mut dyn FnMut(PageImage) -> Result<()>) -> Result<()>;
}
