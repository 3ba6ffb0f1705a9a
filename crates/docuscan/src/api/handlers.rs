//! API request handlers.

use std::path::{Path, PathBuf};

use axum::{
    Json,
    extract::{Multipart, State, multipart::Field},
};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::core::scan::scan_file;
use crate::error::DocuscanError;
use crate::storage::remove_temp_file;

use super::{
    error::ApiError,
    types::{ApiState, HealthResponse, InfoResponse, OcrResponse, supported_formats},
};

const FILE_FIELD: &str = "file";
const OCTET_STREAM: &str = "application/octet-stream";

/// OCR endpoint handler.
///
/// POST /ocr
///
/// Accepts multipart form data with a single `file` field holding a PDF, HEIC/HEIF or
/// raster image. The upload is streamed to `<upload_dir>/<uuid>.<ext>`, loaded into pages
/// and run through the OCR pipeline on a blocking worker. The uploaded file is removed
/// afterwards unless `keep_upload` is set.
///
/// # Errors
///
/// - 400 for a missing file, empty filename, disallowed content type or any loader failure
///   (unsupported format, decode failure, page limit, storage failure)
/// - 413 if the request body exceeds the configured limit
/// - 500 if the worker running the pipeline dies
pub async fn ocr_handler(State(state): State<ApiState>, mut multipart: Multipart) -> Result<Json<OcrResponse>, ApiError> {
    let mut upload: Option<StoredUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(ApiError::multipart)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if upload.is_some() {
            return Err(ApiError::validation(DocuscanError::validation(
                "Only one file may be uploaded per request",
            )));
        }

        let filename = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::validation(DocuscanError::validation("Uploaded file has no filename")))?;
        let content_type = resolve_content_type(field.content_type(), &filename)?;

        let mut stored = StoredUpload::new(&state.config.upload_dir, filename, &content_type);
        stored.write_from(field).await?;
        upload = Some(stored);
    }

    let mut upload = upload.ok_or_else(|| {
        ApiError::validation(DocuscanError::validation(format!(
            "No '{}' field in the multipart body",
            FILE_FIELD
        )))
    })?;

    tracing::info!(
        filename = %upload.filename,
        path = %upload.path.display(),
        bytes = upload.bytes,
        "Received upload"
    );

    let loader = state.loader.clone();
    let engine = state.engine.clone();
    let max_pages = state.config.max_pages;
    let path = upload.path.clone();
    let filename = upload.filename.clone();

    let outcome =
        tokio::task::spawn_blocking(move || scan_file(&loader, &engine, &path, &filename, max_pages)).await;

    if state.config.keep_upload {
        upload.keep();
    }

    match outcome {
        Ok(Ok(document)) => Ok(Json(document)),
        Ok(Err(e)) => Err(ApiError::from(e)),
        Err(join_error) => Err(ApiError::internal(DocuscanError::server(format!(
            "OCR worker failed: {}",
            join_error
        )))),
    }
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Server info endpoint handler.
///
/// GET /info
pub async fn info_handler(State(state): State<ApiState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        formats: supported_formats(),
        max_pages: state.config.max_pages,
    })
}

/// An uploaded source file on disk. Removed on drop unless kept.
struct StoredUpload {
    path: PathBuf,
    filename: String,
    bytes: u64,
    keep: bool,
}

impl StoredUpload {
    fn new(upload_dir: &Path, filename: String, content_type: &str) -> Self {
        let extension = upload_extension(&filename, content_type);
        let name = match extension {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        Self {
            path: upload_dir.join(name),
            filename,
            bytes: 0,
            keep: false,
        }
    }

    /// Stream the field to disk chunk by chunk.
    async fn write_from(&mut self, mut field: Field<'_>) -> Result<(), ApiError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            ApiError::from(DocuscanError::storage_with_source(
                format!("Failed to create upload directory {}", dir.display()),
                e,
            ))
        })?;

        let mut file = tokio::fs::File::create(&self.path).await.map_err(|e| self.write_error(e))?;
        while let Some(chunk) = field.chunk().await.map_err(ApiError::multipart)? {
            file.write_all(&chunk).await.map_err(|e| self.write_error(e))?;
            self.bytes += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| self.write_error(e))?;
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> ApiError {
        ApiError::from(DocuscanError::storage_with_source(
            format!("Failed to store upload {}", self.path.display()),
            source,
        ))
    }

    fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if !self.keep {
            remove_temp_file(&self.path);
        }
    }
}

/// Effective content type of an upload, checked against the allow-list.
///
/// A missing or generic `application/octet-stream` type is guessed from the filename.
fn resolve_content_type(declared: Option<&str>, filename: &str) -> Result<String, ApiError> {
    let declared = declared
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != OCTET_STREAM);

    let content_type = match declared {
        Some(ct) => ct,
        None => mime_guess::from_path(filename)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| OCTET_STREAM.to_string()),
    };

    if is_allowed_content_type(&content_type) {
        Ok(content_type)
    } else {
        Err(ApiError::validation(DocuscanError::unsupported_format(format!(
            "Content type '{}' is not accepted (expected application/pdf or image/*)",
            content_type
        ))))
    }
}

fn is_allowed_content_type(content_type: &str) -> bool {
    content_type == "application/pdf" || content_type.starts_with("image/")
}

/// Extension for the stored copy: the uploaded name's own extension if it has a sane one,
/// otherwise one derived from the content type.
fn upload_extension(filename: &str, content_type: &str) -> Option<String> {
    let from_name = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.or_else(|| match content_type {
        "application/pdf" => Some("pdf".to_string()),
        "image/heic" => Some("heic".to_string()),
        "image/heif" => Some("heif".to_string()),
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|extensions| extensions.first())
            .map(|ext| ext.to_string()),
    })
}
