//! Two-step metadata fetch: share page, then listing endpoint.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ExtractError;
use crate::extract::headers::share_page_headers;
use crate::extract::tokens::PageTokens;
use crate::extract::FileMetadata;
use crate::format::format_size;

/// Listing endpoint resolving a share id into concrete file entries.
pub const LIST_ENDPOINT: &str = "https://dm.terabox.app/share/list";

/// Fixed application identifier the listing endpoint expects.
const APP_ID: &str = "250528";

/// Resolves a share link into [`FileMetadata`] with two sequential GETs.
///
/// No retries anywhere in this path: a transient failure at either HTTP call
/// surfaces immediately to the caller. Timeouts are bounded by the shared
/// [`reqwest::Client`] this fetcher is constructed with.
#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    client: reqwest::Client,
    cookie: String,
    list_endpoint: String,
}

impl MetadataFetcher {
    /// Create a fetcher using the given client and upstream session cookie.
    pub fn new(client: reqwest::Client, cookie: impl Into<String>) -> Self {
        Self {
            client,
            cookie: cookie.into(),
            list_endpoint: LIST_ENDPOINT.to_string(),
        }
    }

    /// Override the listing endpoint (integration tests point this at a
    /// local stub).
    #[must_use]
    pub fn with_list_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.list_endpoint = endpoint.into();
        self
    }

    /// Resolve `link` into file metadata, building the proxy URL against
    /// `base_url` (the serving host as the caller reaches it).
    pub async fn fetch(&self, link: &str, base_url: &str) -> Result<FileMetadata, ExtractError> {
        if link.trim().is_empty() {
            return Err(ExtractError::EmptyLink);
        }

        // Step 1: the public share page. Redirects are followed; the final
        // URL carries the `surl` share identifier and the body carries the
        // embedded tokens.
        let response = self
            .client
            .get(link)
            .headers(share_page_headers(&self.cookie))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::ShareFetch {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let surl = final_url
            .query_pairs()
            .find(|(key, _)| key == "surl")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .ok_or(ExtractError::MissingShareId)?;

        let body = response.text().await?;
        let tokens = PageTokens::extract(&body).ok_or(ExtractError::MissingTokens)?;
        debug!(surl = %surl, "share page tokens extracted");

        // Step 2: the listing endpoint, authenticated by the scraped tokens.
        let list_url = self.build_list_url(&tokens, final_url.as_str(), &surl);
        let listing: ShareListResponse = self
            .client
            .get(&list_url)
            .headers(share_page_headers(&self.cookie))
            .send()
            .await?
            .json()
            .await?;

        metadata_from_listing(listing, base_url)
    }

    fn build_list_url(&self, tokens: &PageTokens, referer: &str, surl: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("app_id", APP_ID)
            .append_pair("web", "1")
            .append_pair("channel", "dubox")
            .append_pair("clienttype", "0")
            .append_pair("jsToken", &tokens.js_token)
            .append_pair("dp-logid", &tokens.log_id)
            .append_pair("page", "1")
            .append_pair("num", "20")
            .append_pair("by", "name")
            .append_pair("order", "asc")
            .append_pair("site_referer", referer)
            .append_pair("shorturl", surl)
            .append_pair("root", "1,")
            .finish();
        format!("{}?{}", self.list_endpoint, query)
    }
}

/// Listing endpoint response payload.
#[derive(Debug, Deserialize)]
struct ShareListResponse {
    #[serde(default)]
    errno: i64,
    #[serde(default)]
    errmsg: Option<String>,
    #[serde(default)]
    list: Vec<ShareFile>,
}

#[derive(Debug, Deserialize)]
struct ShareFile {
    #[serde(default)]
    server_filename: Option<String>,
    #[serde(default)]
    dlink: Option<String>,
    /// Arrives as a JSON number or a string depending on the file.
    #[serde(default)]
    size: Option<Value>,
    #[serde(default)]
    thumbs: Option<Thumbs>,
}

#[derive(Debug, Deserialize)]
struct Thumbs {
    #[serde(default)]
    url3: Option<String>,
}

/// Build the relay's own proxy URL for a direct download link.
pub(crate) fn build_proxy_url(base_url: &str, download_link: &str, file_name: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("url", download_link)
        .append_pair("file_name", file_name)
        .finish();
    format!("{}/terabox/proxy?{}", base_url.trim_end_matches('/'), query)
}

fn metadata_from_listing(
    listing: ShareListResponse,
    base_url: &str,
) -> Result<FileMetadata, ExtractError> {
    if listing.errno != 0 {
        return Err(ExtractError::NoFiles {
            message: listing.errmsg.filter(|m| !m.is_empty()),
        });
    }
    let Some(file) = listing.list.into_iter().next() else {
        return Err(ExtractError::NoFiles {
            message: listing.errmsg.filter(|m| !m.is_empty()),
        });
    };

    let server_filename = file.server_filename.filter(|name| !name.is_empty());
    let file_name = server_filename
        .clone()
        .unwrap_or_else(|| "unknown".to_string());
    // The proxy link historically falls back to "download", not "unknown".
    let proxy_name = server_filename.unwrap_or_else(|| "download".to_string());

    let download_link = file.dlink.unwrap_or_default();
    let thumbnail = file
        .thumbs
        .and_then(|thumbs| thumbs.url3)
        .unwrap_or_default();
    let size_bytes = parse_size(file.size.as_ref());

    Ok(FileMetadata {
        proxy_url: build_proxy_url(base_url, &download_link, &proxy_name),
        file_size: format_size(size_bytes),
        file_name,
        download_link,
        thumbnail,
        size_bytes,
        source_link: None,
        fetched_at: None,
    })
}

/// Upstream `size` is loosely typed; anything unparseable counts as 0.
fn parse_size(value: Option<&Value>) -> u64 {
    match value {
        Some(value) => value
            .as_u64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .unwrap_or(0),
        None => 0,
    }
}
