//! docuscan - document page normalization and two-stage OCR orchestration.
//!
//! docuscan takes a single document (PDF, HEIC/HEIF or a common raster image), turns it into
//! a sequence of temporary PNG pages, runs text detection and recognition over each page and
//! returns per-page regions plus a reading-order text block.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docuscan::{InputLoader, OcrEngine, ocr::Quad};
//! use image::RgbImage;
//! use std::path::Path;
//!
//! # fn main() -> docuscan::Result<()> {
//! // Detection and recognition are pluggable capabilities.
//! let engine = OcrEngine::new(
//!     |_: &RgbImage| -> docuscan::Result<Vec<Quad>> { Ok(Vec::new()) },
//!     |_: &RgbImage| -> docuscan::Result<String> { Ok(String::new()) },
//! );
//!
//! let bundle = InputLoader::default().load(Path::new("scan.pdf"), None, Some(20))?;
//! let result = engine.run(bundle, "scan.pdf");
//! for page in &result.pages {
//!     println!("page {}: {}", page.page, page.full_text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Decoding** (`decode`): PDF rasterization, HEIC and raster decoding into page frames
//! - **Storage** (`storage`): PNG materialization and the self-cleaning [`PageBundle`]
//! - **Loading** (`loader`): extension dispatch, page ceiling, all-or-nothing cleanup
//! - **OCR** (`ocr`): capabilities, cropping, reading order, page pipeline, orchestration
//! - **Core** (`core`): configuration and end-to-end entry points
//! - **API** (`api`, feature `api`): Axum HTTP boundary

#![deny(unsafe_code)]

pub mod core;
pub mod decode;
pub mod error;
pub mod loader;
pub mod ocr;
pub mod storage;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

pub use error::{DocuscanError, ErrorScope, Result};

pub use core::config::DocuscanConfig;
pub use core::scan::{scan_file, scan_file_with_config};
pub use decode::{FormatDecoder, InputKind, PageImage};
pub use loader::{InputLoader, load_input_file};
pub use ocr::{OcrEngine, TextDetector, TextRecognizer};
pub use storage::{MaterializedPage, PageBundle};
pub use types::{DocumentResult, PageOcr, PageResult, TextRegion};
