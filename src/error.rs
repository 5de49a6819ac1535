//! Error types for extraction and proxying.
//!
//! Extraction failures are caller-input or scrape problems and map to 400 on
//! the HTTP surface. Proxy failures distinguish a bad request (400), an
//! upstream download failure (502), and an internal fault (500). The
//! Telegram surface degrades any of these into a chat message instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors that can occur while resolving a share link into file metadata.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The caller supplied no link at all.
    #[error("Link cannot be empty.")]
    EmptyLink,

    /// The initial share-page fetch returned a non-success status.
    #[error("Initial fetch failed with status: {status}")]
    ShareFetch { status: u16 },

    /// The post-redirect URL carried no `surl` share identifier.
    #[error("Invalid link (missing surl param).")]
    MissingShareId,

    /// One or more of the embedded page tokens could not be scraped.
    #[error("Required tokens not found in page.")]
    MissingTokens,

    /// The listing endpoint returned an empty file list or an error code.
    #[error("{}", message.as_deref().unwrap_or("File list retrieval failed."))]
    NoFiles { message: Option<String> },

    /// An outbound HTTP request failed at the transport level.
    #[error("Upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl ExtractError {
    /// HTTP status for the REST surface. Input and scrape problems are all
    /// the caller's 400; nothing in this path is retried or escalated.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors that can occur while proxying a direct download.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The caller omitted the `url` query parameter.
    #[error("Missing download URL.")]
    MissingUrl,

    /// The upstream download fetch returned neither 2xx nor 206.
    #[error("Download fetch failed: {status}")]
    Upstream { status: u16 },

    /// Unexpected failure while issuing the request or building the stream.
    #[error("Proxy error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingUrl => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
