//! Configuration and end-to-end entry points.
//!
//! ```rust,no_run
//! use docuscan::core::config::DocuscanConfig;
//! use docuscan::core::scan::scan_file_with_config;
//! use docuscan::ocr::{OcrEngine, Quad};
//! use image::RgbImage;
//! use std::path::Path;
//!
//! # fn main() -> docuscan::Result<()> {
//! let config = DocuscanConfig::resolve(None)?;
//! let engine = OcrEngine::new(
//!     |_: &RgbImage| -> docuscan::Result<Vec<Quad>> { Ok(Vec::new()) },
//!     |_: &RgbImage| -> docuscan::Result<String> { Ok(String::new()) },
//! );
//! let result = scan_file_with_config(&engine, Path::new("scan.pdf"), &config)?;
//! println!("{} pages", result.pages.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod scan;

pub use config::{ApiConfig, DocuscanConfig};
pub use scan::{scan_file, scan_file_with_config};
