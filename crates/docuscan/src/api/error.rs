//! Mapping from crate errors to HTTP responses.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::{DocuscanError, ErrorScope};

use super::types::ErrorResponse;

/// An error returned by a handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_type: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// 400 Bad Request.
    pub fn validation(error: DocuscanError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error.kind(), error.to_string())
    }

    /// 500 Internal Server Error.
    pub fn internal(error: DocuscanError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.kind(), error.to_string())
    }

    /// Keeps the status axum picked, so an oversized body stays a 413.
    pub fn multipart(error: MultipartError) -> Self {
        let status = error.status();
        let error_type = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "PayloadTooLarge"
        } else {
            "ValidationError"
        };
        Self::new(status, error_type, error.body_text())
    }
}

impl From<DocuscanError> for ApiError {
    fn from(error: DocuscanError) -> Self {
        match error.scope() {
            ErrorScope::Request | ErrorScope::Configuration => Self::validation(error),
            ErrorScope::Page | ErrorScope::Region | ErrorScope::Service => Self::internal(error),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error_type = %self.error_type, "{}", self.message);
        } else {
            tracing::info!(status = self.status.as_u16(), error_type = %self.error_type, "{}", self.message);
        }

        let body = ErrorResponse {
            error_type: self.error_type,
            message: self.message,
            status_code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}
