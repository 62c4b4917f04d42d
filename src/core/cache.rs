//! Bounded in-memory translation cache.
//!
//! Least-recently-used eviction once `capacity` entries are held, with an
//! optional TTL after which an entry is treated as absent.

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::core::language::LanguageTag;

/// Cache key: exact input text plus the normalized language pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub text: String,
    pub source: LanguageTag,
    pub target: LanguageTag,
}

impl CacheKey {
    pub fn new(text: impl Into<String>, source: LanguageTag, target: LanguageTag) -> Self {
        Self {
            text: text.into(),
            source,
            target,
        }
    }
}

struct CacheEntry {
    translated: String,
    inserted_at: Instant,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Thread-safe LRU cache of translations
pub struct TranslationCache {
    inner: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for TranslationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationCache")
            .field("stats", &self.stats())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TranslationCache {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a translation. Expired entries are dropped and count as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let mut cache = self.inner.lock();

        let found = match cache.get(key) {
            Some(entry) if self.is_fresh(entry) => Some(entry.translated.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        };

        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Insert a translation, evicting the least recently used entry when full
    pub fn put(&self, key: CacheKey, translated: String) {
        self.inner.lock().put(
            key,
            CacheEntry {
                translated,
                inserted_at: Instant::now(),
            },
        );
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .map(|ttl| entry.inserted_at.elapsed() < ttl)
            .unwrap_or(true)
    }

    /// Number of stored entries, including not-yet-collected expired ones
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reset counters
    pub fn clear(&self) {
        self.inner.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.inner.lock();
        CacheStats {
            entries: cache.len(),
            capacity: cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
