//! The relay service both transports consume.
//!
//! One extraction contract behind the REST route and the Telegram handler:
//! cache lookup, single-flight deduplication for concurrent fetches of the
//! same link, then the two-step upstream fetch. The cache and fetcher are
//! injected; nothing here is global state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::cache::SessionCache;
use crate::error::ExtractError;
use crate::extract::{FileMetadata, MetadataFetcher};

/// Cache-wrapped, deduplicated link extraction.
pub struct RelayService {
    fetcher: MetadataFetcher,
    cache: Arc<SessionCache>,
    /// Per-link guards: concurrent callers for one uncached link await a
    /// single upstream fetch instead of issuing duplicates.
    inflight: parking_lot::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl RelayService {
    pub fn new(fetcher: MetadataFetcher, cache: Arc<SessionCache>) -> Self {
        Self {
            fetcher,
            cache,
            inflight: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// The cache this service stores results in.
    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Cached record for `link`, if present. Issues no HTTP.
    pub fn cached(&self, link: &str) -> Option<FileMetadata> {
        self.cache.get(link)
    }

    /// Resolve a share link into file metadata.
    ///
    /// A hit returns the stored record unchanged. On a miss, the first
    /// caller performs the fetch while concurrent callers for the same link
    /// wait on its guard and then re-read the cache.
    pub async fn resolve(
        &self,
        link: &str,
        base_url: &str,
    ) -> Result<FileMetadata, ExtractError> {
        if let Some(hit) = self.cache.get(link) {
            debug!(link = %link, "cache hit");
            return Ok(hit);
        }

        let guard = {
            let mut inflight = self.inflight.lock();
            inflight
                .entry(link.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        let _held = guard.lock().await;

        // Another caller may have completed the fetch while we waited.
        if let Some(hit) = self.cache.get(link) {
            debug!(link = %link, "cache hit after awaiting in-flight fetch");
            self.forget_inflight(link);
            return Ok(hit);
        }

        // The cache is populated before the guard leaves the registry, so a
        // caller arriving in between still finds either the guard or the
        // cached record, never neither.
        let outcome = match self.fetcher.fetch(link, base_url).await {
            Ok(mut meta) => {
                meta.source_link = Some(link.to_string());
                meta.fetched_at = Some(Utc::now());
                self.cache.put(link, meta.clone());
                info!(link = %link, file = %meta.file_name, "share link resolved");
                Ok(meta)
            }
            Err(err) => Err(err),
        };
        self.forget_inflight(link);
        outcome
    }

    fn forget_inflight(&self, link: &str) {
        self.inflight.lock().remove(link);
    }
}
