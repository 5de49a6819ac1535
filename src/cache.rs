//! Process-lifetime session cache.
//!
//! Two explicit structures, deliberately not one: a bounded, TTL'd
//! link → metadata map (LRU eviction at capacity) and a separate
//! most-recent-first history deque capped at [`HISTORY_LIMIT`]. History
//! entries are recorded on every fresh fetch through the cached path, never
//! on a hit. Stored records are returned as-is; the cache never mutates one.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::extract::FileMetadata;

/// Maximum number of entries kept in the recent-history list.
pub const HISTORY_LIMIT: usize = 10;

/// Default capacity of the metadata map.
pub const DEFAULT_CAPACITY: usize = 256;

/// Default time-to-live for cached metadata. Direct links expire upstream;
/// an hour keeps the cache useful without serving long-dead links.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

struct CacheEntry {
    meta: FileMetadata,
    stored_at: Instant,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Keys in recency order; front is the least recently used.
    order: VecDeque<String>,
    history: VecDeque<FileMetadata>,
}

/// Shared in-memory cache of extraction results, keyed by the caller's link.
pub struct SessionCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    ttl: Duration,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCache {
    /// Create a cache with the default capacity and TTL.
    pub fn new() -> Self {
        Self::with_policy(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    /// Create a cache with an explicit capacity and TTL.
    pub fn with_policy(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                history: VecDeque::new(),
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Look up a cached record. Expired entries are dropped on access; a hit
    /// refreshes the entry's recency.
    pub fn get(&self, link: &str) -> Option<FileMetadata> {
        let mut inner = self.inner.lock();

        let expired = match inner.entries.get(link) {
            Some(entry) => entry.stored_at.elapsed() > self.ttl,
            None => return None,
        };
        if expired {
            inner.entries.remove(link);
            inner.order.retain(|key| key != link);
            return None;
        }

        let position = inner.order.iter().position(|key| key == link);
        if let Some(position) = position {
            inner.order.remove(position);
        }
        inner.order.push_back(link.to_string());

        inner.entries.get(link).map(|entry| entry.meta.clone())
    }

    /// Store a freshly fetched record and push it onto the history list.
    /// Evicts the least recently used entry when at capacity.
    pub fn put(&self, link: &str, meta: FileMetadata) {
        let mut inner = self.inner.lock();

        if !inner.entries.contains_key(link) {
            while inner.entries.len() >= self.capacity {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        } else {
            inner.order.retain(|key| key != link);
        }

        inner.history.push_front(meta.clone());
        inner.history.truncate(HISTORY_LIMIT);

        inner.order.push_back(link.to_string());
        inner.entries.insert(
            link.to_string(),
            CacheEntry {
                meta,
                stored_at: Instant::now(),
            },
        );
    }

    /// Most-recent-first list of the last fetched records.
    pub fn recent(&self) -> Vec<FileMetadata> {
        self.inner.lock().history.iter().cloned().collect()
    }

    /// Number of live entries in the metadata map.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str) -> FileMetadata {
        FileMetadata {
            file_name: name.to_string(),
            download_link: format!("https://d.example.com/{name}"),
            thumbnail: String::new(),
            size_bytes: 1024,
            file_size: "1.00 KB".to_string(),
            proxy_url: format!("http://relay.test/terabox/proxy?url={name}"),
            source_link: None,
            fetched_at: None,
        }
    }

    #[test]
    fn test_get_returns_stored_record_unchanged() {
        let cache = SessionCache::new();
        cache.put("link-a", meta("a.mp4"));

        let hit = cache.get("link-a").unwrap();
        assert_eq!(hit, meta("a.mp4"));
        assert!(cache.get("link-b").is_none());
    }

    #[test]
    fn test_ttl_expiry_drops_entry() {
        let cache = SessionCache::with_policy(16, Duration::from_millis(0));
        cache.put("link-a", meta("a.mp4"));
        std::thread::sleep(Duration::from_millis(5));

        assert!(cache.get("link-a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction_at_capacity() {
        let cache = SessionCache::with_policy(2, DEFAULT_TTL);
        cache.put("a", meta("a"));
        cache.put("b", meta("b"));

        // Touch "a" so "b" becomes the least recently used.
        assert!(cache.get("a").is_some());
        cache.put("c", meta("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_put_same_link_does_not_grow_map() {
        let cache = SessionCache::with_policy(4, DEFAULT_TTL);
        cache.put("a", meta("v1"));
        cache.put("a", meta("v2"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().file_name, "v2");
    }

    #[test]
    fn test_history_is_capped_and_most_recent_first() {
        let cache = SessionCache::new();
        for i in 0..15 {
            cache.put(&format!("link-{i}"), meta(&format!("file-{i}")));
        }

        let recent = cache.recent();
        assert_eq!(recent.len(), HISTORY_LIMIT);
        assert_eq!(recent[0].file_name, "file-14");
        assert_eq!(recent[9].file_name, "file-5");
    }

    #[test]
    fn test_history_not_touched_by_hits() {
        let cache = SessionCache::new();
        cache.put("a", meta("a"));
        let _ = cache.get("a");
        let _ = cache.get("a");

        assert_eq!(cache.recent().len(), 1);
    }
}
