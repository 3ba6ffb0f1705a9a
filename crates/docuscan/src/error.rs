//! Error types for docuscan.
//!
//! Every fallible operation in the crate returns [`DocuscanError`]. The variants form a
//! closed taxonomy, grouped by how far a failure reaches:
//!
//! - **Request scope** - `UnsupportedFormat`, `Decode`, `PageLimitExceeded`, `Storage`.
//!   The input could not be turned into pages; nothing useful can be returned.
//! - **Page scope** - `ImageRead`, `Detection`. One page could not be processed; the
//!   orchestrator records the failure on that page and moves on.
//! - **Region scope** - `Recognition`. Never escapes the page pipeline; the region keeps its
//!   geometry and gets an empty text.
//! - **Configuration scope** - `Validation`, `Serialization`. Invalid configuration or
//!   boundary input.
//! - **Service scope** - `Server`. The HTTP listener could not bind or stopped with an error.
//!
//! Foreign errors are mapped explicitly at the call site so the variant always says which
//! stage failed. There is intentionally no blanket `From<std::io::Error>`: a failed write is
//! a `Storage` error, a failed read of the source is a `Decode` error, and a failed read of a
//! materialized page is an `ImageRead` error.
//!
//! # Example
//!
//! ```rust
//! use docuscan::{DocuscanError, ErrorScope, Result};
//!
//! fn check(page_count: usize, max_pages: usize) -> Result<()> {
//!     if page_count > max_pages {
//!         return Err(DocuscanError::PageLimitExceeded { page_count, max_pages });
//!     }
//!     Ok(())
//! }
//!
//! let err = check(3, 1).unwrap_err();
//! assert_eq!(err.scope(), ErrorScope::Request);
//! ```
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `DocuscanError`.
pub type Result<T> = std::result::Result<T, DocuscanError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// How far a failure reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// The whole request fails.
    Request,
    /// Only the current page fails.
    Page,
    /// Only the current region degrades.
    Region,
    /// Configuration or boundary input is invalid.
    Configuration,
    /// The hosting service itself failed.
    Service,
}

/// Main error type for all docuscan operations.
#[derive(Debug, Error)]
pub enum DocuscanError {
    #[error("Unsupported format: {message}")]
    UnsupportedFormat { message: String },

    #[error("Decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Page limit exceeded: document has {page_count} pages, limit is {max_pages}")]
    PageLimitExceeded { page_count: usize, max_pages: usize },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Cannot read page image {}: {message}", path.display())]
    ImageRead {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Detection error: {message}")]
    Detection {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Recognition error: {message}")]
    Recognition {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Server error: {message}")]
    Server {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl From<serde_json::Error> for DocuscanError {
    fn from(err: serde_json::Error) -> Self {
        DocuscanError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "pdf")]
impl From<crate::decode::pdf::PdfError> for DocuscanError {
    fn from(err: crate::decode::pdf::PdfError) -> Self {
        DocuscanError::Decode {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DocuscanError {
    error_constructor!(decode, Decode);
    error_constructor!(storage, Storage);
    error_constructor!(detection, Detection);
    error_constructor!(recognition, Recognition);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);
    error_constructor!(server, Server);

    /// Create an UnsupportedFormat error
    pub fn unsupported_format<S: Into<String>>(message: S) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /// Create an ImageRead error for the page at `path`
    pub fn image_read<P, S, E>(path: P, message: S, source: Option<E>) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageRead {
            path: path.into(),
            message: message.into(),
            source: source.map(|e| Box::new(e) as BoxedSource),
        }
    }

    /// Which part of the processing run this error invalidates.
    pub fn scope(&self) -> ErrorScope {
        match self {
            Self::UnsupportedFormat { .. }
            | Self::Decode { .. }
            | Self::PageLimitExceeded { .. }
            | Self::Storage { .. } => ErrorScope::Request,
            Self::ImageRead { .. } | Self::Detection { .. } => ErrorScope::Page,
            Self::Recognition { .. } => ErrorScope::Region,
            Self::Validation { .. } | Self::Serialization { .. } => ErrorScope::Configuration,
            Self::Server { .. } => ErrorScope::Service,
        }
    }

    /// Stable, machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "UnsupportedFormatError",
            Self::Decode { .. } => "DecodeError",
            Self::PageLimitExceeded { .. } => "PageLimitExceeded",
            Self::Storage { .. } => "StorageError",
            Self::ImageRead { .. } => "ImageReadError",
            Self::Detection { .. } => "DetectionError",
            Self::Recognition { .. } => "RecognitionError",
            Self::Validation { .. } => "ValidationError",
            Self::Serialization { .. } => "SerializationError",
            Self::Server { .. } => "ServerError",
        }
    }
}
