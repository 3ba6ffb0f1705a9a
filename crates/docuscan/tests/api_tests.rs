//! HTTP boundary tests driven through the router with `oneshot`.

#![cfg(all(feature = "api", feature = "pdf"))]

mod helpers;

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use docuscan::api::{ApiState, ErrorResponse, HealthResponse, InfoResponse, create_router_with_state};
use docuscan::ocr::{OcrEngine, Quad};
use docuscan::{DocuscanConfig, DocumentResult};
use helpers::{FakeRasterizer, FixedDetector, SizeRecognizer, file_count, loader_with, whole_page_engine, write_pdf};
use image::{ImageFormat, Rgb, RgbImage};
use serde::de::DeserializeOwned;
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

const BOUNDARY: &str = "docuscan-test-boundary";

fn router(engine: OcrEngine, upload_dir: &Path, config: DocuscanConfig) -> Router {
    let config = DocuscanConfig {
        upload_dir: upload_dir.to_path_buf(),
        ..config
    };
    let loader = loader_with(Arc::new(FakeRasterizer::default()), upload_dir);
    create_router_with_state(ApiState::new(engine, loader, config))
}

fn multipart_body(field: &str, filename: Option<&str>, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    let disposition = match filename {
        Some(name) => format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n"),
        None => format!("Content-Disposition: form-data; name=\"{field}\"\r\n"),
    };
    body.extend_from_slice(disposition.as_bytes());
    if let Some(content_type) = content_type {
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ocr")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

async fn json_body<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn pdf_bytes(dir: &TempDir, pages: usize) -> Vec<u8> {
    let path = dir.path().join("fixture.pdf");
    write_pdf(&path, pages);
    std::fs::read(path).unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = tempdir().unwrap();
    let app = router(whole_page_engine(), dir.path(), DocuscanConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = json_body(response).await;
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_info_reports_formats_and_limit() {
    let dir = tempdir().unwrap();
    let config = DocuscanConfig {
        max_pages: Some(7),
        ..Default::default()
    };
    let app = router(whole_page_engine(), dir.path(), config);

    let response = app
        .oneshot(Request::builder().uri("/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let info: InfoResponse = json_body(response).await;
    assert_eq!(info.max_pages, Some(7));
    assert!(info.formats.iter().any(|format| format == "pdf"));
    assert!(info.formats.iter().any(|format| format == "png"));
}

#[tokio::test]
async fn test_ocr_png_upload() {
    let dir = tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let engine = OcrEngine::new(FixedDetector::new(vec![Quad::from_rect(0.0, 0.0, 8.0, 4.0)]), SizeRecognizer);
    let app = router(engine, &uploads, DocuscanConfig::default());

    let body = multipart_body("file", Some("note.png"), Some("image/png"), &png_bytes(20, 20));
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let document: DocumentResult = json_body(response).await;
    assert_eq!(document.filename, "note.png");
    assert_eq!(document.pages.len(), 1);
    assert_eq!(document.pages[0].page, 1);
    assert_eq!(document.pages[0].full_text, "8x4");
    assert_eq!(file_count(&uploads), 0, "upload and pages are removed");
}

#[tokio::test]
async fn test_ocr_response_wire_shape() {
    let dir = tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let engine = OcrEngine::new(FixedDetector::new(vec![Quad::from_rect(1.0, 2.0, 5.0, 6.0)]), SizeRecognizer);
    let app = router(engine, &uploads, DocuscanConfig::default());

    let body = multipart_body("file", Some("a.png"), Some("image/png"), &png_bytes(10, 10));
    let response = app.oneshot(upload_request(body)).await.unwrap();
    let value: serde_json::Value = json_body(response).await;

    assert_eq!(
        value,
        serde_json::json!({
            "filename": "a.png",
            "pages": [{
                "page": 1,
                "results": [{"bbox": [[1.0, 2.0], [5.0, 2.0], [5.0, 6.0], [1.0, 6.0]], "text": "4x4"}],
                "full_text": "4x4"
            }]
        })
    );
}

#[tokio::test]
async fn test_ocr_pdf_with_failing_page() {
    let dir = tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let engine = OcrEngine::new(
        FixedDetector::new(vec![Quad::from_rect(0.0, 0.0, 10.0, 10.0)]).failing_on(2),
        SizeRecognizer,
    );
    let app = router(engine, &uploads, DocuscanConfig::default());

    let body = multipart_body("file", Some("three.pdf"), Some("application/pdf"), &pdf_bytes(&dir, 3));
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let document: DocumentResult = json_body(response).await;
    assert_eq!(document.pages.len(), 3);
    assert!(document.pages[0].error.is_none());
    assert!(document.pages[1].error.is_some());
    assert!(document.pages[1].results.is_empty());
    assert!(document.pages[2].error.is_none());
    assert_eq!(file_count(&uploads), 0);
}

#[tokio::test]
async fn test_octet_stream_pdf_resolved_from_filename() {
    let dir = tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let app = router(whole_page_engine(), &uploads, DocuscanConfig::default());

    let body = multipart_body(
        "file",
        Some("two.pdf"),
        Some("application/octet-stream"),
        &pdf_bytes(&dir, 2),
    );
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let document: DocumentResult = json_body(response).await;
    assert_eq!(document.pages.len(), 2);
}

#[tokio::test]
async fn test_page_limit_is_bad_request() {
    let dir = tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let config = DocuscanConfig {
        max_pages: Some(2),
        ..Default::default()
    };
    let app = router(whole_page_engine(), &uploads, config);

    let body = multipart_body("file", Some("long.pdf"), Some("application/pdf"), &pdf_bytes(&dir, 4));
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response).await;
    assert_eq!(error.error_type, "PageLimitExceeded");
    assert_eq!(error.status_code, 400);
    assert!(error.message.contains('4'));
    assert_eq!(file_count(&uploads), 0);
}

#[tokio::test]
async fn test_undecodable_image_is_bad_request() {
    let dir = tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let app = router(whole_page_engine(), &uploads, DocuscanConfig::default());

    let body = multipart_body("file", Some("photo.jpg"), Some("image/jpeg"), b"these bytes are not a jpeg");
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response).await;
    assert_eq!(error.error_type, "UnsupportedFormatError");
    assert_eq!(file_count(&uploads), 0);
}

#[tokio::test]
async fn test_disallowed_content_type_is_rejected() {
    let dir = tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let app = router(whole_page_engine(), &uploads, DocuscanConfig::default());

    let body = multipart_body("file", Some("notes.txt"), Some("text/plain"), b"hello");
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(file_count(&uploads), 0);
}

#[tokio::test]
async fn test_missing_filename_is_rejected() {
    let dir = tempdir().unwrap();
    let app = router(whole_page_engine(), dir.path(), DocuscanConfig::default());

    let body = multipart_body("file", Some(""), Some("image/png"), &png_bytes(4, 4));
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response).await;
    assert_eq!(error.error_type, "ValidationError");
}

#[tokio::test]
async fn test_missing_file_field_is_rejected() {
    let dir = tempdir().unwrap();
    let app = router(whole_page_engine(), dir.path(), DocuscanConfig::default());

    let body = multipart_body("document", Some("a.png"), Some("image/png"), &png_bytes(4, 4));
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_over_limit_is_rejected() {
    let dir = tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let mut config = DocuscanConfig::default();
    config.api.max_request_body_bytes = 1024;
    let app = router(whole_page_engine(), &uploads, config);

    let body = multipart_body("file", Some("big.png"), Some("image/png"), &vec![0u8; 8 * 1024]);
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(file_count(&uploads), 0);
}

#[tokio::test]
async fn test_keep_upload_leaves_source_only() {
    let dir = tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let config = DocuscanConfig {
        keep_upload: true,
        ..Default::default()
    };
    let app = router(whole_page_engine(), &uploads, config);

    let body = multipart_body("file", Some("keep.png"), Some("image/png"), &png_bytes(6, 6));
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let remaining: Vec<_> = std::fs::read_dir(&uploads).unwrap().filter_map(|e| e.ok()).collect();
    assert_eq!(remaining.len(), 1);
    assert_eq!(std::fs::read(remaining[0].path()).unwrap(), png_bytes(6, 6));
}
