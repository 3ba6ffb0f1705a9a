//! Document-level OCR: every page of a bundle, in order, with per-page isolation.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::OcrEngine;
use crate::storage::PageBundle;
use crate::types::{DocumentResult, PageResult};

impl OcrEngine {
    /// Run the page pipeline over every page of `bundle`.
    ///
    /// Always yields one [`PageResult`] per page. A page that fails (unreadable image,
    /// detector error, or a panic inside the pipeline) gets an empty result with the error
    /// message and the remaining pages still run. The bundle is released before returning.
    pub fn run(&self, mut bundle: PageBundle, filename: impl Into<String>) -> DocumentResult {
        let filename = filename.into();
        let mut pages = Vec::with_capacity(bundle.len());

        for page in &bundle {
            let outcome = catch_unwind(AssertUnwindSafe(|| self.run_page(&page.path)));
            let result = match outcome {
                Ok(Ok(ocr)) => {
                    tracing::debug!(page = page.page_number, regions = ocr.regions.len(), "Page processed");
                    PageResult::success(page.page_number, ocr)
                }
                Ok(Err(e)) => {
                    tracing::warn!(page = page.page_number, filename = %filename, "Page failed: {}", e);
                    PageResult::failed(page.page_number, e.to_string())
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::warn!(page = page.page_number, filename = %filename, "Page pipeline panicked: {}", message);
                    PageResult::failed(page.page_number, format!("OCR pipeline panicked: {message}"))
                }
            };
            pages.push(result);
        }

        bundle.release();

        let failed = pages.iter().filter(|page| page.is_error()).count();
        tracing::info!(filename = %filename, pages = pages.len(), failed, "Document processed");

        DocumentResult { filename, pages }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
