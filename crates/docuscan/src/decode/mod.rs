//! Format decoding: one input file in, a sequence of in-memory page frames out.
//!
//! Dispatch happens on the lowercase, trimmed file extension:
//!
//! - `.pdf` - every page is rasterized at the configured DPI (see [`pdf`])
//! - `.heic` / `.heif` - the primary frame is decoded (see [`heic`])
//! - anything else - the bytes are identified by content and decoded as a raster image
//!   (see [`raster`])
//!
//! Decoding has no side effects. Frames are handed to a callback one at a time so the caller
//! can persist each page before the next one is rendered.

pub mod heic;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod raster;

use std::path::Path;
#[cfg(feature = "pdf")]
use std::sync::Arc;

use image::{ColorType, DynamicImage, RgbImage};

use crate::Result;

/// Default rasterization resolution for PDF pages.
pub const DEFAULT_RENDER_DPI: u16 = 200;

/// Decode branch selected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Heic,
    Raster,
}

impl InputKind {
    /// Pick the branch for a path. Paths without an extension are treated as raster images.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Raster)
    }

    /// Pick the branch for an extension, with or without the leading dot.
    pub fn from_extension(extension: &str) -> Self {
        let normalized = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "pdf" => Self::Pdf,
            "heic" | "heif" => Self::Heic,
            _ => Self::Raster,
        }
    }

    pub fn is_multi_page(self) -> bool {
        matches!(self, Self::Pdf)
    }
}

/// A decoded page frame.
#[derive(Debug, Clone)]
pub struct PageImage {
    image: DynamicImage,
}

impl PageImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel format of the frame.
    pub fn color(&self) -> ColorType {
        self.image.color()
    }

    /// Convert the frame to 8-bit RGB, dropping alpha and widening grayscale.
    pub fn normalized(self) -> Self {
        match self.image {
            DynamicImage::ImageRgb8(_) => self,
            other => Self {
                image: DynamicImage::ImageRgb8(other.into_rgb8()),
            },
        }
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_rgb8(self) -> RgbImage {
        self.image.into_rgb8()
    }
}

impl From<RgbImage> for PageImage {
    fn from(image: RgbImage) -> Self {
        Self::new(DynamicImage::ImageRgb8(image))
    }
}

/// Turns source documents into page frames.
///
/// Holds the PDF rasterizer (swappable so tests and alternative renderers can be plugged in)
/// and the rasterization resolution.
#[derive(Clone)]
pub struct FormatDecoder {
    #[cfg(feature = "pdf")]
    rasterizer: Arc<dyn pdf::PdfRasterizer>,
    dpi: u16,
}

impl std::fmt::Debug for FormatDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatDecoder").field("dpi", &self.dpi).finish_non_exhaustive()
    }
}

impl Default for FormatDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DPI)
    }
}

impl FormatDecoder {
    /// Decoder using the pdfium rasterizer (when the `pdf` feature is enabled).
    pub fn new(dpi: u16) -> Self {
        Self {
            #[cfg(feature = "pdf")]
            rasterizer: Arc::new(pdf::PdfiumRasterizer::new()),
            dpi,
        }
    }

    #[cfg(feature = "pdf")]
    pub fn with_rasterizer(rasterizer: Arc<dyn pdf::PdfRasterizer>, dpi: u16) -> Self {
        Self { rasterizer, dpi }
    }

    pub fn dpi(&self) -> u16 {
        self.dpi
    }

    /// Number of pages the document will produce.
    ///
    /// For PDFs the rasterizer opens the document without rendering anything. Every other
    /// format yields exactly one page.
    pub fn page_count(&self, path: &Path, kind: InputKind) -> Result<usize> {
        match kind {
            InputKind::Pdf => self.pdf_page_count(path),
            InputKind::Heic | InputKind::Raster => Ok(1),
        }
    }

    /// Decode every frame of `path` into memory.
    pub fn decode(&self, path: &Path) -> Result<Vec<PageImage>> {
        let mut pages = Vec::new();
        self.decode_each(path, InputKind::from_path(path), &mut |page| {
            pages.push(page);
            Ok(())
        })?;
        Ok(pages)
    }

    /// Decode `path` and hand each frame to `on_page` in page order.
    ///
    /// An error returned by `on_page` stops decoding and is propagated unchanged.
    pub fn decode_each(
        &self,
        path: &Path,
        kind: InputKind,
        on_page: &mut dyn FnMut(PageImage) -> Result<()>,
    ) -> Result<()> {
        match kind {
            InputKind::Pdf => self.rasterize_pdf(path, on_page),
            InputKind::Heic => on_page(heic::decode_heic(path)?.normalized()),
            InputKind::Raster => on_page(raster::decode_raster(path)?),
        }
    }

    #[cfg(feature = "pdf")]
    fn pdf_page_count(&self, path: &Path) -> Result<usize> {
        self.rasterizer.page_count(path)
    }

    #[cfg(not(feature = "pdf"))]
    fn pdf_page_count(&self, path: &Path) -> Result<usize> {
        Err(pdf_disabled(path))
    }

    #[cfg(feature = "pdf")]
    fn rasterize_pdf(&self, path: &Path, on_page: &mut dyn FnMut(PageImage) -> Result<()>) -> Result<()> {
        self.rasterizer.rasterize(path, self.dpi, on_page)
    }

    #[cfg(not(feature = "pdf"))]
    fn rasterize_pdf(&self, path: &Path, _on_page: &mut dyn FnMut(PageImage) -> Result<()>) -> Result<()> {
        Err(pdf_disabled(path))
    }
}

#[cfg(not(feature = "pdf"))]
fn pdf_disabled(path: &Path) -> crate::DocuscanError {
    crate::DocuscanError::decode(format!(
        "Cannot open {}: PDF support is not enabled (build with the `pdf` feature)",
        path.display()
    ))
}
