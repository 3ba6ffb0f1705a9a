//! Result types returned by the OCR pipeline.
//!
//! These serialize to the wire shape served by the HTTP boundary:
//!
//! ```json
//! { "filename": "scan.pdf",
//!   "pages": [ { "page": 1,
//!                "results": [ { "bbox": [[0.0, 0.0], [9.0, 0.0], [9.0, 4.0], [0.0, 4.0]], "text": "Hi" } ],
//!                "full_text": "Hi" } ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::ocr::geometry::Quad;

/// A detected region and the text recognized inside it.
///
/// `text` is empty when recognition failed or found nothing; the region is still reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub bbox: Quad,
    pub text: String,
}

impl TextRegion {
    pub fn new(bbox: Quad, text: impl Into<String>) -> Self {
        Self { bbox, text: text.into() }
    }
}

/// Output of the page pipeline for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageOcr {
    /// Regions in detector order.
    pub regions: Vec<TextRegion>,
    /// Region texts in reading order, joined by newlines.
    pub full_text: String,
}

/// Result for one page of a document.
///
/// A failed page has no regions, an empty `full_text` and a message in `error`. The
/// constructors are the only way this crate builds one, so that shape always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-based page number.
    pub page: usize,
    pub results: Vec<TextRegion>,
    pub full_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    pub fn success(page: usize, ocr: PageOcr) -> Self {
        Self {
            page,
            results: ocr.regions,
            full_text: ocr.full_text,
            error: None,
        }
    }

    pub fn failed(page: usize, error: impl Into<String>) -> Self {
        Self {
            page,
            results: Vec::new(),
            full_text: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Per-page results for a whole document, one entry per materialized page, in page order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub filename: String,
    pub pages: Vec<PageResult>,
}

impl DocumentResult {
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageResult> {
        self.pages.iter().filter(|page| page.is_error())
    }
}
