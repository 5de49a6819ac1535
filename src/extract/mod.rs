//! Share-link extraction core.
//!
//! Scrapes the tokens embedded in a public TeraBox share page, then asks the
//! internal listing endpoint for the real filename and direct download link.

pub mod fetcher;
pub mod headers;
pub mod tokens;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use fetcher::MetadataFetcher;
pub use tokens::{find_between, PageTokens};

/// Everything the relay knows about one shared file.
///
/// `file_size` is always `format_size(size_bytes)` and `proxy_url` is always
/// derived from the download link, the filename, and the serving base URL;
/// neither is an independent source of truth. Records are immutable once
/// constructed; the cache stores and returns them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Display name of the remote file; `"unknown"` when absent upstream.
    pub file_name: String,
    /// Upstream direct-download URL; empty means no download is possible.
    pub download_link: String,
    /// Optional preview image URL; empty when none.
    pub thumbnail: String,
    /// File size in bytes; a missing upstream field is 0.
    pub size_bytes: u64,
    /// Human-readable size, derived from `size_bytes`.
    pub file_size: String,
    /// Same-origin proxy URL serving the download through this relay.
    pub proxy_url: String,
    /// Original caller-supplied link (stamped by the cached path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
    /// When the extraction happened (stamped by the cached path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl FileMetadata {
    /// Whether a usable download link was obtained.
    pub fn has_download(&self) -> bool {
        !self.download_link.is_empty()
    }
}
