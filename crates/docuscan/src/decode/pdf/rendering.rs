use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;

use super::PdfRasterizer;
use super::bindings::bind_pdfium;
use super::error::PdfError;
use crate::Result;
use crate::decode::PageImage;

const PDF_POINTS_PER_INCH: f64 = 72.0;

/// Largest width or height, in pixels, of a rendered page.
///
/// Pages that would exceed it at the requested DPI are rendered at a lower effective DPI.
pub const DEFAULT_MAX_IMAGE_DIMENSION: i32 = 8192;

/// Rasterizes PDF pages with pdfium.
///
/// Bindings are obtained from the process-wide lazy initialization on each call, so one
/// rasterizer can be shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct PdfiumRasterizer {
    max_image_dimension: i32,
}

impl Default for PdfiumRasterizer {
    fn default() -> Self {
        Self {
            max_image_dimension: DEFAULT_MAX_IMAGE_DIMENSION,
        }
    }
}

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the longest side of every rendered page at `max_image_dimension` pixels.
    pub fn with_max_image_dimension(max_image_dimension: i32) -> Self {
        Self {
            max_image_dimension: max_image_dimension.max(1),
        }
    }

    pub fn max_image_dimension(&self) -> i32 {
        self.max_image_dimension
    }
}

fn load_document<'a>(pdfium: &'a Pdfium, path: &Path) -> std::result::Result<PdfDocument<'a>, PdfError> {
    pdfium.load_pdf_from_file(path, None).map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("password") || err_msg.contains("Password") {
            PdfError::PasswordRequired
        } else {
            PdfError::InvalidPdf(err_msg)
        }
    })
}

impl PdfRasterizer for PdfiumRasterizer {
    fn page_count(&self, path: &Path) -> Result<usize> {
        let pdfium = Pdfium::new(bind_pdfium("page counting")?);
        let document = load_document(&pdfium, path)?;
        let page_count = document.pages().len() as usize;
        tracing::debug!(path = %path.display(), page_count, "Counted PDF pages");
        Ok(page_count)
    }

    fn rasterize(&self, path: &Path, dpi: u16, on_page: &mut dyn FnMut(PageImage) -> Result<()>) -> Result<()> {
        let pdfium = Pdfium::new(bind_pdfium("page rasterization")?);
        let document = load_document(&pdfium, path)?;

        // Pages are rendered and handed over one at a time so only one bitmap is alive.
        for (page_index, page) in document.pages().iter().enumerate() {
            let image = render_page(&page, dpi, self.max_image_dimension)
                .map_err(|e| PdfError::RenderingFailed(format!("page {}: {}", page_index + 1, e)))?;
            tracing::debug!(
                page = page_index + 1,
                width = image.width(),
                height = image.height(),
                dpi,
                "Rendered PDF page"
            );
            on_page(PageImage::new(image))?;
        }

        Ok(())
    }
}

fn render_page(page: &PdfPage<'_>, dpi: u16, max_dimension: i32) -> std::result::Result<DynamicImage, PdfiumError> {
    let (width, height) = target_size(page.width().value as f64, page.height().value as f64, dpi, max_dimension);

    let config = PdfRenderConfig::new()
        .set_target_width(width)
        .set_target_height(height)
        .rotate_if_landscape(PdfPageRenderRotation::None, false);

    let bitmap = page.render_with_config(&config)?;
    Ok(DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8()))
}

/// DPI at which the longest side of the page fits in `max_dimension` pixels.
fn effective_dpi(page_width: f64, page_height: f64, target_dpi: f64, max_dimension: i32) -> f64 {
    let longest_inches = page_width.max(page_height) / PDF_POINTS_PER_INCH;
    if longest_inches * target_dpi <= max_dimension as f64 {
        return target_dpi;
    }

    let capped = max_dimension as f64 / longest_inches;
    tracing::debug!(target_dpi, capped_dpi = capped, "Oversized PDF page, lowering render DPI");
    capped
}

/// Pixel size of a page of `width_points` x `height_points` rendered at `dpi`.
fn target_size(width_points: f64, height_points: f64, dpi: u16, max_dimension: i32) -> (i32, i32) {
    let scale = effective_dpi(width_points, height_points, dpi as f64, max_dimension) / PDF_POINTS_PER_INCH;
    let pixels = |points: f64| ((points * scale).round() as i32).clamp(1, max_dimension);
    (pixels(width_points), pixels(height_points))
}
