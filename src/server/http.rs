//! HTTP surface.
//!
//! Implements:
//! - Extraction API (POST /terabox)
//! - Streaming proxy (GET /terabox/proxy)
//! - Health check (GET /health)

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::proxy::StreamProxy;
use crate::service::RelayService;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RelayService>,
    pub proxy: Arc<StreamProxy>,
    /// Externally reachable base URL; when unset, derived per-request from
    /// the Host header.
    pub public_base_url: Option<String>,
    /// Server start time (Unix timestamp).
    pub start_time: i64,
}

/// Create the HTTP router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/terabox", post(extract_handler))
        .route("/terabox/proxy", get(proxy_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Request body for POST /terabox.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub link: Option<String>,
}

/// Query parameters for GET /terabox/proxy.
#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// POST /terabox - resolve a share link into file metadata.
async fn extract_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ExtractRequest>,
) -> Response {
    let link = req.link.unwrap_or_default();
    let base_url = request_base_url(state.public_base_url.as_deref(), &headers);

    match state.service.resolve(&link, &base_url).await {
        Ok(meta) => (StatusCode::OK, Json(meta)).into_response(),
        Err(err) => {
            warn!(link = %link, error = %err, "extraction failed");
            err.into_response()
        }
    }
}

/// GET /terabox/proxy - stream a direct download through the relay.
async fn proxy_handler(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
    headers: HeaderMap,
) -> Response {
    let url = params.url.unwrap_or_default();
    let file_name = params.file_name.unwrap_or_else(|| "download".to_string());
    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    match state.proxy.stream(&url, &file_name, range).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "proxy request failed");
            err.into_response()
        }
    }
}

/// GET /health - lightweight liveness probe.
async fn health_handler(State(state): State<AppState>) -> Response {
    let uptime = chrono::Utc::now().timestamp() - state.start_time;
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "uptimeSeconds": uptime,
        })),
    )
        .into_response()
}

/// Base URL the caller reached us at, for building proxy links.
fn request_base_url(public_base_url: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(base) = public_base_url {
        return base.trim_end_matches('/').to_string();
    }
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(|host| format!("http://{host}"))
        .unwrap_or_else(|| "http://localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_base_url_prefers_configured_base() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "internal:3000".parse().unwrap());
        assert_eq!(
            request_base_url(Some("https://relay.example.com/"), &headers),
            "https://relay.example.com"
        );
    }

    #[test]
    fn test_request_base_url_derives_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "relay.test:8080".parse().unwrap());
        assert_eq!(request_base_url(None, &headers), "http://relay.test:8080");
    }

    #[test]
    fn test_request_base_url_without_host_header() {
        assert_eq!(
            request_base_url(None, &HeaderMap::new()),
            "http://localhost"
        );
    }
}
