//! Input loading: source document in, [`PageBundle`] of PNG pages out.
//!
//! The loader is all-or-nothing. Either every page of the document is materialized, or no
//! file written by this call survives.

use std::path::{Path, PathBuf};

use crate::core::config::DocuscanConfig;
use crate::decode::{FormatDecoder, InputKind};
use crate::storage::{self, PageBundle};
use crate::{DocuscanError, Result};

/// Default directory for temporary page files.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Converts source documents into page bundles.
#[derive(Debug, Clone)]
pub struct InputLoader {
    decoder: FormatDecoder,
    upload_dir: PathBuf,
}

impl Default for InputLoader {
    fn default() -> Self {
        Self::new(FormatDecoder::default(), DEFAULT_UPLOAD_DIR)
    }
}

impl InputLoader {
    pub fn new(decoder: FormatDecoder, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            decoder,
            upload_dir: upload_dir.into(),
        }
    }

    /// Loader using the pdfium rasterizer at the configured DPI and upload directory.
    pub fn from_config(config: &DocuscanConfig) -> Self {
        Self::new(FormatDecoder::new(config.render_dpi), config.upload_dir.clone())
    }

    pub fn decoder(&self) -> &FormatDecoder {
        &self.decoder
    }

    /// Directory used when `load` is not given one.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Materialize every page of `path` as a PNG under `upload_dir` (or the loader's default).
    ///
    /// For PDFs the page count is checked against `max_pages` before anything is rendered.
    /// Pages are written one by one as they are decoded; if any page fails, every page
    /// already written by this call is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// - `PageLimitExceeded` if a PDF has more than `max_pages` pages
    /// - `UnsupportedFormat` if a raster input cannot be identified
    /// - `Decode` if a recognized format cannot be decoded
    /// - `Storage` if a page cannot be written
    pub fn load(&self, path: &Path, upload_dir: Option<&Path>, max_pages: Option<usize>) -> Result<PageBundle> {
        let target_dir = upload_dir.unwrap_or(&self.upload_dir);
        storage::ensure_dir(target_dir)?;

        let kind = InputKind::from_path(path);
        if kind.is_multi_page()
            && let Some(max_pages) = max_pages
        {
            let page_count = self.decoder.page_count(path, kind)?;
            if page_count > max_pages {
                tracing::info!(
                    path = %path.display(),
                    page_count,
                    max_pages,
                    "Rejecting document over the page limit"
                );
                return Err(DocuscanError::PageLimitExceeded { page_count, max_pages });
            }
        }

        let mut bundle = PageBundle::new();
        let outcome = self.decoder.decode_each(path, kind, &mut |page| {
            let written = storage::materialize(&page, target_dir)?;
            bundle.push(written);
            Ok(())
        });

        match outcome {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    kind = ?kind,
                    pages = bundle.len(),
                    "Materialized document pages"
                );
                Ok(bundle)
            }
            Err(err) => {
                let removed = bundle.release();
                tracing::warn!(
                    path = %path.display(),
                    removed,
                    "Loading failed, removed partially written pages: {}",
                    err
                );
                Err(err)
            }
        }
    }
}

/// Load `path` with the default decoder and upload directory.
///
/// Equivalent to `InputLoader::default().load(path, upload_dir, max_pages)`.
pub fn load_input_file(
    path: impl AsRef<Path>,
    upload_dir: Option<&Path>,
    max_pages: Option<usize>,
) -> Result<PageBundle> {
    InputLoader::default().load(path.as_ref(), upload_dir, max_pages)
}
