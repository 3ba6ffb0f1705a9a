//! API request and response types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::config::DocuscanConfig;
use crate::loader::InputLoader;
use crate::ocr::OcrEngine;
use crate::types::DocumentResult;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status
    pub status: String,
    /// API version
    pub version: String,
}

/// Server information response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    /// API version
    pub version: String,
    /// Input formats this build can decode, by extension
    pub formats: Vec<String>,
    /// Page ceiling applied to PDFs, if any
    pub max_pages: Option<usize>,
}

/// OCR response: per-page results for the uploaded document.
pub type OcrResponse = DocumentResult;

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type name
    pub error_type: String,
    /// Error message
    pub message: String,
    /// HTTP status code
    pub status_code: u16,
}

/// API server state.
///
/// Shared by every request: the OCR models, the loader (decoder and upload directory) and
/// the effective configuration.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub engine: OcrEngine,
    pub loader: Arc<InputLoader>,
    pub config: Arc<DocuscanConfig>,
}

impl ApiState {
    pub fn new(engine: OcrEngine, loader: InputLoader, config: DocuscanConfig) -> Self {
        Self {
            engine,
            loader: Arc::new(loader),
            config: Arc::new(config),
        }
    }

    /// State whose loader is built from `config`.
    pub fn from_config(engine: OcrEngine, config: DocuscanConfig) -> Self {
        let loader = InputLoader::from_config(&config);
        Self::new(engine, loader, config)
    }
}

/// Extensions accepted by this build.
pub fn supported_formats() -> Vec<String> {
    let mut formats = Vec::new();
    if cfg!(feature = "pdf") {
        formats.push("pdf");
    }
    if cfg!(feature = "heic") {
        formats.extend(["heic", "heif"]);
    }
    formats.extend(["png", "jpg", "jpeg", "webp", "bmp", "tiff", "tif", "gif"]);
    formats.into_iter().map(String::from).collect()
}
