//! API server setup and configuration.

use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::core::config::DocuscanConfig;
use crate::error::DocuscanError;
use crate::ocr::OcrEngine;
use crate::Result;

use super::{
    handlers::{health_handler, info_handler, ocr_handler},
    types::ApiState,
};

/// Comma-separated list of allowed CORS origins.
pub const CORS_ORIGINS_ENV: &str = "DOCUSCAN_CORS_ORIGINS";

/// Create the API router with all routes configured.
///
/// The loader is built from `config` (rasterization DPI, upload directory); the body
/// limit comes from `config.api`.
///
/// # Examples
///
/// ```no_run
/// use docuscan::api::create_router;
/// use docuscan::core::config::DocuscanConfig;
/// use docuscan::ocr::{OcrEngine, Quad};
/// use image::RgbImage;
///
/// # #[tokio::main]
/// # async fn main() {
/// let engine = OcrEngine::new(
///     |_: &RgbImage| -> docuscan::Result<Vec<Quad>> { Ok(Vec::new()) },
///     |_: &RgbImage| -> docuscan::Result<String> { Ok(String::new()) },
/// );
/// let router = create_router(engine, DocuscanConfig::default());
/// let app = axum::Router::new().nest("/api", router);
/// # }
/// ```
pub fn create_router(engine: OcrEngine, config: DocuscanConfig) -> Router {
    create_router_with_state(ApiState::from_config(engine, config))
}

/// Create the API router from a fully assembled state.
pub fn create_router_with_state(state: ApiState) -> Router {
    let body_limit = state.config.api.max_request_body_bytes;

    Router::new()
        .route("/ocr", post(ocr_handler))
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// The default allows all origins; set DOCUSCAN_CORS_ORIGINS in production.
fn cors_layer() -> CorsLayer {
    let Ok(origins_str) = std::env::var(CORS_ORIGINS_ENV) else {
        tracing::warn!(
            "CORS configured to allow all origins (default). Set {} to a comma-separated list of allowed origins for production",
            CORS_ORIGINS_ENV
        );
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    };

    let origins: Vec<_> = origins_str
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "{} set but empty/invalid - falling back to permissive CORS",
            CORS_ORIGINS_ENV
        );
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        tracing::info!("CORS configured with {} explicit allowed origin(s)", origins.len());
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server with config file discovery.
///
/// Searches for `docuscan.toml` in the current and parent directories, falls back to
/// defaults, then applies `DOCUSCAN_*` environment overrides.
///
/// # Environment Variables
///
/// ```bash
/// export DOCUSCAN_UPLOAD_DIR=/var/lib/docuscan/uploads
/// export DOCUSCAN_MAX_PAGES=50
/// export DOCUSCAN_MAX_REQUEST_BODY_BYTES=104857600
/// export DOCUSCAN_CORS_ORIGINS="https://app.example.com"
/// ```
pub async fn serve(host: impl AsRef<str>, port: u16, engine: OcrEngine) -> Result<()> {
    let config = DocuscanConfig::resolve(None)?;
    serve_with_config(host, port, engine, config).await
}

/// Start the API server with explicit config.
pub async fn serve_with_config(host: impl AsRef<str>, port: u16, engine: OcrEngine, config: DocuscanConfig) -> Result<()> {
    let ip: IpAddr = host
        .as_ref()
        .parse()
        .map_err(|e| DocuscanError::validation(format!("Invalid host address: {}", e)))?;
    let addr = SocketAddr::new(ip, port);

    tracing::info!(
        upload_dir = %config.upload_dir.display(),
        max_pages = ?config.max_pages,
        render_dpi = config.render_dpi,
        body_limit = config.api.max_request_body_bytes,
        "Starting docuscan API server on http://{}",
        addr
    );

    let app = create_router(engine, config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DocuscanError::server_with_source(format!("Failed to bind {}", addr), e))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| DocuscanError::server_with_source("Server terminated with an error", e))?;

    Ok(())
}
