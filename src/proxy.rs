//! Streaming download proxy.
//!
//! Re-issues the direct download link server-side and pipes the upstream
//! body straight through to the caller. The body is never buffered: the
//! response stream is handed to the HTTP layer chunk by chunk, so the
//! consumer's read pace is the upstream's read pace, and dropping the
//! downstream connection drops (and thereby aborts) the upstream request.

use axum::body::Body;
use axum::http::header::{
    HeaderName, HeaderValue, ACCEPT_RANGES, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH,
    CONTENT_RANGE, CONTENT_TYPE,
};
use axum::http::StatusCode;
use axum::response::Response;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, warn};

use crate::error::ProxyError;
use crate::extract::headers::download_headers;

/// Characters escaped in the Content-Disposition filename. Matches
/// `encodeURIComponent`: everything but alphanumerics and `-_.!~*'()`.
const FILENAME_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Streams `download_link` back to the caller, forwarding an incoming
/// `Range` header and relaying upstream range/length headers verbatim.
pub struct StreamProxy {
    client: reqwest::Client,
    cookie: String,
}

impl StreamProxy {
    /// Create a proxy using the given client and upstream session cookie.
    ///
    /// The client should carry a connect timeout but no total request
    /// timeout: the body transfer legitimately runs for the length of a
    /// download.
    pub fn new(client: reqwest::Client, cookie: impl Into<String>) -> Self {
        Self {
            client,
            cookie: cookie.into(),
        }
    }

    /// Proxy one download request.
    pub async fn stream(
        &self,
        download_link: &str,
        file_name: &str,
        range: Option<&str>,
    ) -> Result<Response, ProxyError> {
        if download_link.is_empty() {
            return Err(ProxyError::MissingUrl);
        }

        let mut request = self
            .client
            .get(download_link)
            .headers(download_headers(&self.cookie));
        if let Some(range) = range {
            request = request.header(reqwest::header::RANGE, range);
        }

        let upstream = request
            .send()
            .await
            .map_err(|e| ProxyError::Internal(e.to_string()))?;

        let status = upstream.status();
        if !status.is_success() && status != reqwest::StatusCode::PARTIAL_CONTENT {
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
            });
        }
        debug!(status = status.as_u16(), range = ?range, "upstream download fetch ok");

        let mut builder = Response::builder()
            .status(StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::OK))
            .header(CONTENT_TYPE, content_type_of(&upstream))
            .header(CONTENT_DISPOSITION, disposition_for(file_name))
            .header(ACCEPT_RANGES, "bytes")
            .header(CACHE_CONTROL, "public, max-age=3600")
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET,POST,OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type,Range")
            .header("Access-Control-Expose-Headers", "Content-Length,Content-Range");

        builder = relay_header(builder, &upstream, reqwest::header::CONTENT_RANGE, CONTENT_RANGE);
        builder = relay_header(builder, &upstream, reqwest::header::CONTENT_LENGTH, CONTENT_LENGTH);

        builder
            .body(Body::from_stream(upstream.bytes_stream()))
            .map_err(|e| ProxyError::Internal(e.to_string()))
    }
}

fn content_type_of(upstream: &reqwest::Response) -> String {
    upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string()
}

fn disposition_for(file_name: &str) -> String {
    let name = if file_name.is_empty() {
        "download"
    } else {
        file_name
    };
    format!(
        "inline; filename=\"{}\"",
        utf8_percent_encode(name, FILENAME_ESCAPE)
    )
}

/// Copy one upstream header onto the response when present and well-formed.
fn relay_header(
    builder: axum::http::response::Builder,
    upstream: &reqwest::Response,
    from: reqwest::header::HeaderName,
    to: HeaderName,
) -> axum::http::response::Builder {
    match upstream.headers().get(&from).map(HeaderValue::as_bytes) {
        Some(bytes) => match HeaderValue::from_bytes(bytes) {
            Ok(value) => builder.header(to, value),
            Err(_) => {
                warn!(header = %from, "dropping malformed upstream header");
                builder
            }
        },
        None => builder,
    }
}
