//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docuscan::decode::PageImage;
use docuscan::decode::pdf::{PdfRasterizer, pdfium_available};
use docuscan::ocr::{OcrEngine, Quad, TextDetector, TextRecognizer};
use docuscan::{DocuscanError, FormatDecoder, InputLoader, Result};
use image::{ImageFormat, Rgb, RgbImage};
use lopdf::{Document, Object, Stream, dictionary};

/// Install a test subscriber once. Set `RUST_LOG=docuscan=debug` to see pipeline logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Write a PDF with `page_count` empty US Letter pages.
pub fn write_pdf(path: &Path, page_count: usize) {
    write_pdf_with_sizes(path, &vec![(612, 792); page_count]);
}

/// Write a PDF with one empty page per `(width, height)` entry, in points.
pub fn write_pdf_with_sizes(path: &Path, sizes: &[(i64, i64)]) {
    let page_count = sizes.len();
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for &(width, height) in sizes {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// True (and a note on stderr) when pdfium cannot be bound, so pdfium-backed tests can skip.
pub fn pdfium_missing() -> bool {
    if pdfium_available() {
        return false;
    }
    eprintln!("Skipping: pdfium is not available (set DOCUSCAN_PDFIUM_DIR)");
    true
}

/// Write a solid-color image in the given format.
pub fn write_image(path: &Path, width: u32, height: u32, format: ImageFormat) {
    RgbImage::from_pixel(width, height, Rgb([240, 240, 240]))
        .save_with_format(path, format)
        .unwrap();
}

/// Number of entries in `dir` (0 if it doesn't exist).
pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

/// Pretends to rasterize PDFs.
///
/// Page N (1-based) is rendered as an image `N * 10` pixels wide so tests can tell pages
/// apart by size. Reads the page count with lopdf, so the input must be a real PDF.
#[derive(Debug, Default)]
pub struct FakeRasterizer {
    /// Fail when asked for this 1-based page.
    pub fail_on_page: Option<usize>,
    /// Pages handed out, across all calls.
    pub rendered: AtomicUsize,
}

impl FakeRasterizer {
    pub fn failing_on(page: usize) -> Self {
        Self {
            fail_on_page: Some(page),
            ..Default::default()
        }
    }
}

fn lopdf_page_count(path: &Path) -> Result<usize> {
    let document = Document::load(path).map_err(|e| DocuscanError::decode(e.to_string()))?;
    Ok(document.get_pages().len())
}

impl PdfRasterizer for FakeRasterizer {
    fn page_count(&self, path: &Path) -> Result<usize> {
        lopdf_page_count(path)
    }

    fn rasterize(&self, path: &Path, _dpi: u16, on_page: &mut dyn FnMut(PageImage) -> Result<()>) -> Result<()> {
        for page_number in 1..=lopdf_page_count(path)? {
            if self.fail_on_page == Some(page_number) {
                return Err(DocuscanError::decode(format!("page {page_number}: render failed")));
            }
            self.rendered.fetch_add(1, Ordering::SeqCst);
            let width = (page_number * 10) as u32;
            on_page(PageImage::from(RgbImage::from_pixel(width, 40, Rgb([255, 255, 255]))))?;
        }
        Ok(())
    }
}

/// Loader using `rasterizer` for PDFs, writing under `upload_dir`.
pub fn loader_with(rasterizer: Arc<FakeRasterizer>, upload_dir: &Path) -> InputLoader {
    InputLoader::new(FormatDecoder::with_rasterizer(rasterizer, 200), upload_dir)
}

/// Detector returning a fixed list of boxes for every page.
pub struct FixedDetector {
    pub quads: Vec<Quad>,
    pub calls: AtomicUsize,
    /// Fail on this 1-based call.
    pub fail_on_call: Option<usize>,
}

impl FixedDetector {
    pub fn new(quads: Vec<Quad>) -> Self {
        Self {
            quads,
            calls: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }
}

impl TextDetector for FixedDetector {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<Quad>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(DocuscanError::detection(format!("detector failed on call {call}")));
        }
        Ok(self.quads.clone())
    }
}

/// Recognizer answering with the crop size, e.g. `"12x8"`.
#[derive(Debug, Default)]
pub struct SizeRecognizer;

impl TextRecognizer for SizeRecognizer {
    fn recognize(&self, crop: &RgbImage) -> Result<String> {
        Ok(format!("{}x{}", crop.width(), crop.height()))
    }
}

/// Recognizer answering from a lookup on crop width; unknown widths fail.
pub struct TableRecognizer(pub Vec<(u32, &'static str)>);

impl TextRecognizer for TableRecognizer {
    fn recognize(&self, crop: &RgbImage) -> Result<String> {
        self.0
            .iter()
            .find(|(width, _)| *width == crop.width())
            .map(|(_, text)| text.to_string())
            .ok_or_else(|| DocuscanError::recognition(format!("no entry for width {}", crop.width())))
    }
}

/// Engine with one full-page box per page and the size recognizer.
pub fn whole_page_engine() -> OcrEngine {
    OcrEngine::new(
        |image: &RgbImage| -> Result<Vec<Quad>> {
            Ok(vec![Quad::from_rect(0.0, 0.0, image.width() as f32, image.height() as f32)])
        },
        SizeRecognizer,
    )
}
