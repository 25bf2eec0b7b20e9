//! TTL cache for formatted search results.
//!
//! A single `HashMap` behind a reader/writer lock. Lookups take the read
//! lock so concurrent callers never block each other; stores take the
//! write lock. Stale entries are never evicted, they are skipped on lookup
//! and replaced the next time the same key is stored.

use crate::types::Engine;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default lifetime of a cached result.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub engine: Engine,
}

impl CacheKey {
    pub fn new(query: impl Into<String>, engine: Engine) -> Self {
        Self {
            query: query.into(),
            engine,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: String,
    // None when `now + ttl` is past what `Instant` can represent
    expiry: Option<Instant>,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.expiry.map_or(true, |expiry| Instant::now() < expiry)
    }
}

#[derive(Debug)]
pub struct SearchCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl SearchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored result only while `now < expiry`.
    pub fn lookup(&self, key: &CacheKey) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if entry.is_fresh() {
            Some(entry.result.clone())
        } else {
            debug!(query = %key.query, engine = %key.engine, "cache entry expired");
            None
        }
    }

    pub fn store(&self, key: CacheKey, result: String) {
        self.store_with_ttl(key, result, self.ttl);
    }

    /// Inserts or overwrites the entry for `key` with expiry `now + ttl`.
    pub fn store_with_ttl(&self, key: CacheKey, result: String, ttl: Duration) {
        let expiry = Instant::now().checked_add(ttl);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, CacheEntry { result, expiry });
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lookup_miss_on_empty_cache() {
        let cache = SearchCache::default();
        assert_eq!(cache.ttl(), DEFAULT_TTL);
        assert!(cache.lookup(&CacheKey::new("rust", Engine::Google)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_then_hit() {
        let cache = SearchCache::default();
        let key = CacheKey::new("rust", Engine::Google);
        cache.store(key.clone(), "[1] Rust\n".to_string());
        assert_eq!(cache.lookup(&key).as_deref(), Some("[1] Rust\n"));
    }

    #[test]
    fn test_expired_entry_misses() {
        let cache = SearchCache::default();
        let key = CacheKey::new("rust", Engine::Google);
        cache.store_with_ttl(key.clone(), "stale".to_string(), Duration::ZERO);
        assert!(cache.lookup(&key).is_none());
        // Stale entries stay until overwritten
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_oversized_ttl_does_not_overflow() {
        let cache = SearchCache::new(Duration::from_secs(u64::MAX));
        let key = CacheKey::new("rust", Engine::Google);
        cache.store(key.clone(), "kept".to_string());
        assert_eq!(cache.lookup(&key).as_deref(), Some("kept"));

        cache.store_with_ttl(key.clone(), "max".to_string(), Duration::MAX);
        assert_eq!(cache.lookup(&key).as_deref(), Some("max"));
    }

    #[test]
    fn test_overwrite_refreshes_entry() {
        let cache = SearchCache::default();
        let key = CacheKey::new("rust", Engine::Bing);
        cache.store_with_ttl(key.clone(), "old".to_string(), Duration::ZERO);
        cache.store(key.clone(), "new".to_string());
        assert_eq!(cache.lookup(&key).as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_engines_do_not_share_entries() {
        let cache = SearchCache::default();
        cache.store(CacheKey::new("rust", Engine::Google), "google".to_string());
        assert!(cache.lookup(&CacheKey::new("rust", Engine::Bing)).is_none());
        assert_eq!(
            cache.lookup(&CacheKey::new("rust", Engine::Google)).as_deref(),
            Some("google")
        );
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let cache = Arc::new(SearchCache::default());
        let key = CacheKey::new("shared", Engine::Google);
        cache.store(key.clone(), "v0".to_string());

        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    let hit = cache.lookup(&key);
                    assert!(hit.is_some(), "entry should never disappear");
                }
                if i == 0 {
                    cache.store(key, "v1".to_string());
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.lookup(&key).as_deref(), Some("v1"));
    }
}
