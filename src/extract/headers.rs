//! Upstream request header sets.
//!
//! The share-page scrape only works when the request looks like a signed-in
//! browser session: a Chromium fingerprint plus a session cookie. These
//! values mirror the third-party page's observed expectations and will break
//! without notice if that page changes; the cookie is overridable via
//! configuration (`TERABOX_COOKIE`).

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Session cookie sent on all upstream requests unless overridden.
pub const DEFAULT_COOKIE: &str = "ndus=YzeXcd1peHuiK2_zig1UkhLraLgytieQ2TwpyHiy; ndut_fmt=35E53AA0B7793B84FF6E3D1F88C1A7D86BC036C1885B169D0EAA35446C0F2E65;";

/// Browser user agent presented upstream.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/135.0.0.0 Safari/537.36";

/// Referer presented on direct-download requests.
pub const DOWNLOAD_REFERER: &str = "https://terabox.com/";

/// Headers for the share-page and listing requests.
pub fn share_page_headers(cookie: &str) -> HeaderMap {
    let mut headers = browser_fingerprint(cookie);
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers
}

/// Headers for the direct-download (proxy upstream) request.
pub fn download_headers(cookie: &str) -> HeaderMap {
    let mut headers = browser_fingerprint(cookie);
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        reqwest::header::REFERER,
        HeaderValue::from_static(DOWNLOAD_REFERER),
    );
    headers
}

/// The fingerprint both header sets share.
fn browser_fingerprint(cookie: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(USER_AGENT),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        reqwest::header::CONNECTION,
        HeaderValue::from_static("keep-alive"),
    );
    headers.insert(
        HeaderName::from_static("dnt"),
        HeaderValue::from_static("1"),
    );
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(
            "\"Microsoft Edge\";v=\"135\", \"Not-A.Brand\";v=\"8\", \"Chromium\";v=\"135\"",
        ),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?0"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static("\"Windows\""),
    );
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.insert(reqwest::header::COOKIE, value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_page_headers_carry_cookie_and_ua() {
        let headers = share_page_headers(DEFAULT_COOKIE);
        assert_eq!(
            headers.get(reqwest::header::COOKIE).unwrap(),
            DEFAULT_COOKIE
        );
        assert_eq!(
            headers.get(reqwest::header::USER_AGENT).unwrap(),
            USER_AGENT
        );
        assert!(headers.contains_key("sec-fetch-mode"));
    }

    #[test]
    fn test_download_headers_carry_referer() {
        let headers = download_headers(DEFAULT_COOKIE);
        assert_eq!(
            headers.get(reqwest::header::REFERER).unwrap(),
            DOWNLOAD_REFERER
        );
        assert!(!headers.contains_key("sec-fetch-mode"));
    }

    #[test]
    fn test_invalid_cookie_is_dropped_not_panicked() {
        let headers = download_headers("bad\ncookie");
        assert!(!headers.contains_key(reqwest::header::COOKIE));
    }
}
