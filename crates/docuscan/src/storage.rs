//! Temporary page files.
//!
//! [`materialize`] writes a frame to `<dir>/<uuid>.png`. [`PageBundle`] owns the files
//! written for one document and removes them exactly once, either through
//! [`PageBundle::release`] or when the bundle is dropped.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use uuid::Uuid;

use crate::decode::PageImage;
use crate::{DocuscanError, Result};

/// Create `dir` (and parents) if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        DocuscanError::storage_with_source(format!("Failed to create directory {}", dir.display()), e)
    })
}

/// Persist `page` as a lossless PNG under `target_dir` and return its path.
///
/// The file name is a random v4 UUID, so concurrent requests sharing a directory never
/// collide.
pub fn materialize(page: &PageImage, target_dir: &Path) -> Result<PathBuf> {
    ensure_dir(target_dir)?;

    let path = target_dir.join(format!("{}.png", Uuid::new_v4()));
    page.as_dynamic()
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| {
            // A failed encode can leave a partial file behind.
            remove_temp_file(&path);
            DocuscanError::storage_with_source(format!("Failed to write page image {}", path.display()), e)
        })?;

    Ok(path)
}

/// Remove one temporary file. A file that is already gone is not an error; any other failure is
/// logged and swallowed.
///
/// Returns `true` if a file was actually removed.
pub fn remove_temp_file(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!("Failed to remove temporary file {}: {}", path.display(), e);
            false
        }
    }
}

/// A page written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedPage {
    pub path: PathBuf,
    /// 1-based position in the source document.
    pub page_number: usize,
}

/// The temporary page files produced from one source document, in page order.
///
/// Releasing is idempotent: after the first release further calls do nothing, and files
/// removed by someone else in the meantime are skipped silently. Dropping an unreleased
/// bundle releases it.
#[derive(Debug, Default)]
pub struct PageBundle {
    pages: Vec<MaterializedPage>,
    released: bool,
}

impl PageBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an already-written page file. It becomes the next page.
    pub fn push(&mut self, path: PathBuf) -> &MaterializedPage {
        let page_number = self.pages.len() + 1;
        self.pages.push(MaterializedPage { path, page_number });
        &self.pages[page_number - 1]
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[MaterializedPage] {
        &self.pages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MaterializedPage> {
        self.pages.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.pages.iter().map(|page| page.path.as_path())
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Remove every page file. Returns how many files were actually removed by this call.
    pub fn release(&mut self) -> usize {
        if self.released {
            return 0;
        }
        self.released = true;

        let removed = self.pages.iter().filter(|page| remove_temp_file(&page.path)).count();
        tracing::debug!(pages = self.pages.len(), removed, "Released page bundle");
        removed
    }

    /// Disarm cleanup and hand the paths to the caller, who becomes responsible for them.
    pub fn keep(mut self) -> Vec<PathBuf> {
        self.released = true;
        std::mem::take(&mut self.pages).into_iter().map(|page| page.path).collect()
    }
}

impl Drop for PageBundle {
    fn drop(&mut self) {
        self.release();
    }
}

impl<'a> IntoIterator for &'a PageBundle {
    type Item = &'a MaterializedPage;
    type IntoIter = std::slice::Iter<'a, MaterializedPage>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}
