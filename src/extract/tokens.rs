//! Token scraping for the share page.
//!
//! The share page embeds three values the listing endpoint requires: a JS
//! execution token, a `dp-logid`, and a `bdstoken`. None of them appear in a
//! structured form; each sits between a fixed pair of delimiter strings in
//! the raw HTML.

/// Delimiters around the JS execution token (`fn%28%22<token>%22%29`).
const JS_TOKEN_START: &str = "fn%28%22";
const JS_TOKEN_END: &str = "%22%29";

/// Delimiters around the log id (`dp-logid=<id>&`).
const LOG_ID_START: &str = "dp-logid=";
const LOG_ID_END: &str = "&";

/// Delimiters around the bdstoken (`bdstoken":"<token>"`).
const BDSTOKEN_START: &str = "bdstoken\":\"";
const BDSTOKEN_END: &str = "\"";

/// Returns the substring strictly between the first occurrence of `start`
/// and the first occurrence of `end` *after* `start`'s position.
///
/// The `end` search must begin where `start` finished: an `end` occurring
/// earlier in the document must not match. `None` when either delimiter is
/// absent.
pub fn find_between<'a>(haystack: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let start_idx = haystack.find(start)? + start.len();
    let rest = &haystack[start_idx..];
    let end_idx = rest.find(end)?;
    Some(&rest[..end_idx])
}

/// The three tokens scraped from a share page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTokens {
    pub js_token: String,
    pub log_id: String,
    pub bdstoken: String,
}

impl PageTokens {
    /// Scrape all three tokens from the share-page HTML.
    ///
    /// Each scrape is independent; the page carries the delimiters in no
    /// guaranteed order. `None` when any token is missing.
    pub fn extract(html: &str) -> Option<Self> {
        let js_token = find_between(html, JS_TOKEN_START, JS_TOKEN_END)?;
        let log_id = find_between(html, LOG_ID_START, LOG_ID_END)?;
        let bdstoken = find_between(html, BDSTOKEN_START, BDSTOKEN_END)?;

        if js_token.is_empty() || log_id.is_empty() || bdstoken.is_empty() {
            return None;
        }

        Some(PageTokens {
            js_token: js_token.to_string(),
            log_id: log_id.to_string(),
            bdstoken: bdstoken.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_PAGE: &str = concat!(
        "<html><head><script>window.jsToken%20=%20fn%28%22AB12CD34%22%29;",
        "</script></head><body>",
        "<a href=\"/track?dp-logid=87654321&clienttype=0\">x</a>",
        "<script>var ctx = {\"bdstoken\":\"deadbeef99\",\"uk\":\"1\"};</script>",
        "</body></html>"
    );

    #[test]
    fn test_find_between_basic() {
        assert_eq!(find_between("a[x]b", "[", "]"), Some("x"));
        assert_eq!(
            find_between("pre start VALUE end post", "start ", " end"),
            Some("VALUE")
        );
    }

    #[test]
    fn test_find_between_missing_start() {
        assert_eq!(find_between("no delimiters here ]", "[", "]"), None);
    }

    #[test]
    fn test_find_between_missing_end() {
        assert_eq!(find_between("a[x", "[", "]"), None);
    }

    #[test]
    fn test_find_between_end_before_start_does_not_match() {
        // "]" exists, but only before "[", so it must not be treated as a close.
        assert_eq!(find_between("]a[x", "[", "]"), None);
    }

    #[test]
    fn test_find_between_uses_first_occurrences() {
        assert_eq!(find_between("[a][b]", "[", "]"), Some("a"));
    }

    #[test]
    fn test_find_between_empty_value() {
        assert_eq!(find_between("[]", "[", "]"), Some(""));
    }

    #[test]
    fn test_extract_tokens_from_fixture_page() {
        let tokens = PageTokens::extract(FIXTURE_PAGE).unwrap();
        assert_eq!(tokens.js_token, "AB12CD34");
        assert_eq!(tokens.log_id, "87654321");
        assert_eq!(tokens.bdstoken, "deadbeef99");
    }

    #[test]
    fn test_extract_tokens_missing_any_is_none() {
        let no_bdstoken = FIXTURE_PAGE.replace("bdstoken", "nothere");
        assert!(PageTokens::extract(&no_bdstoken).is_none());

        let no_logid = FIXTURE_PAGE.replace("dp-logid=", "dp-nope=");
        assert!(PageTokens::extract(&no_logid).is_none());

        assert!(PageTokens::extract("<html></html>").is_none());
    }
}
