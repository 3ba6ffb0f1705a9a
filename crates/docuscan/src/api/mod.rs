//! REST API server for docuscan.
//!
//! An Axum-based HTTP boundary around the loader and OCR pipeline.
//!
//! # Endpoints
//!
//! - `POST /ocr` - OCR an uploaded document (multipart form data, one `file` field)
//! - `GET /health` - Health check endpoint
//! - `GET /info` - Server information
//!
//! # Starting the server
//!
//! ```no_run
//! use docuscan::api::serve;
//! use docuscan::ocr::{OcrEngine, Quad};
//! use image::RgbImage;
//!
//! #[tokio::main]
//! async fn main() -> docuscan::Result<()> {
//!     let engine = OcrEngine::new(
//!         |_: &RgbImage| -> docuscan::Result<Vec<Quad>> { Ok(Vec::new()) },
//!         |_: &RgbImage| -> docuscan::Result<String> { Ok(String::new()) },
//!     );
//!     serve("127.0.0.1", 8000, engine).await?;
//!     Ok(())
//! }
//! ```
//!
//! # cURL Examples
//!
//! ```bash
//! curl -F "file=@scan.pdf" http://localhost:8000/ocr
//! curl http://localhost:8000/health
//! curl http://localhost:8000/info
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{CORS_ORIGINS_ENV, create_router, create_router_with_state, serve, serve_with_config};
pub use types::{ApiState, ErrorResponse, HealthResponse, InfoResponse, OcrResponse, supported_formats};
