//! End-to-end entry points: load a document, then OCR every page.

use std::path::Path;

use crate::Result;
use crate::core::config::DocuscanConfig;
use crate::loader::InputLoader;
use crate::ocr::OcrEngine;
use crate::types::DocumentResult;

/// Load `path` into pages and run OCR on each.
///
/// Loader failures fail the whole call. Page failures are reported on the page. All
/// temporary page files are gone when this returns, whatever the outcome.
///
/// # Errors
///
/// Request-level loader errors: `UnsupportedFormat`, `Decode`, `PageLimitExceeded`, `Storage`.
pub fn scan_file(
    loader: &InputLoader,
    engine: &OcrEngine,
    path: &Path,
    filename: &str,
    max_pages: Option<usize>,
) -> Result<DocumentResult> {
    let bundle = loader.load(path, None, max_pages)?;
    Ok(engine.run(bundle, filename))
}

/// [`scan_file`] with a loader and page limit taken from `config`.
pub fn scan_file_with_config(engine: &OcrEngine, path: &Path, config: &DocuscanConfig) -> Result<DocumentResult> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    scan_file(&InputLoader::from_config(config), engine, path, &filename, config.max_pages)
}
