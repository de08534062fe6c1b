/*!
 * Translation caching functionality.
 *
 * This module provides a bounded, insertion-ordered cache consulted before the
 * backend. When full, the earliest inserted entry is evicted regardless of how
 * recently it was read (FIFO, not LRU).
 */

use log::debug;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::language_utils::LanguageTag;

use super::domain::DomainTag;
use super::resolver::truncate_text;

/// Default number of entries kept
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Cache key combining text, resolved languages and domain
///
/// Matching is exact: case and whitespace differences produce distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Trimmed request text
    pub text: String,

    /// Resolved source language
    pub source: LanguageTag,

    /// Target language
    pub target: LanguageTag,

    /// Selected domain
    pub domain: Option<DomainTag>,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(text: &str, source: LanguageTag, target: LanguageTag, domain: Option<DomainTag>) -> Self {
        Self {
            text: text.to_string(),
            source,
            target,
            domain,
        }
    }
}

#[derive(Debug, Default)]
struct CacheStore {
    entries: HashMap<CacheKey, String>,
    /// Keys in insertion order, oldest first
    order: VecDeque<CacheKey>,
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f64,
    pub entries: usize,
}

/// Translation cache for storing and retrieving translations
///
/// Clones share the same storage.
#[derive(Debug, Clone)]
pub struct TranslationCache {
    /// Internal cache storage
    store: Arc<RwLock<CacheStore>>,

    /// Cache hit counter
    hits: Arc<AtomicUsize>,

    /// Cache miss counter
    misses: Arc<AtomicUsize>,

    /// Maximum number of entries
    capacity: usize,

    /// Whether caching is enabled
    enabled: Arc<AtomicBool>,
}

impl TranslationCache {
    /// Create a new translation cache
    pub fn new(capacity: usize, enabled: bool) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::default())),
            hits: Arc::new(AtomicUsize::new(0)),
            misses: Arc::new(AtomicUsize::new(0)),
            capacity: capacity.max(1),
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Get a translation from the cache
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }

        let store = self.store.read();

        match store.entries.get(key) {
            Some(translation) => {
                self.hits.fetch_add(1, Ordering::Relaxed);

                debug!("Cache hit for '{}' ({} -> {})",
                       truncate_text(&key.text, 30),
                       key.source,
                       key.target);

                Some(translation.clone())
            },
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);

                debug!("Cache miss for '{}' ({} -> {})",
                       truncate_text(&key.text, 30),
                       key.source,
                       key.target);

                None
            }
        }
    }

    /// Store a translation in the cache
    ///
    /// Replacing an existing key keeps its insertion position.
    pub fn put(&self, key: CacheKey, translation: &str) {
        if !self.is_enabled() {
            return;
        }

        let mut store = self.store.write();

        if let Some(existing) = store.entries.get_mut(&key) {
            *existing = translation.to_string();
            return;
        }

        while store.order.len() >= self.capacity {
            match store.order.pop_front() {
                Some(oldest) => {
                    store.entries.remove(&oldest);
                    debug!("Evicted '{}' from translation cache", truncate_text(&oldest.text, 30));
                }
                None => break,
            }
        }

        debug!("Cached translation for '{}' ({} -> {})",
               truncate_text(&key.text, 30),
               key.source,
               key.target);

        store.order.push_back(key.clone());
        store.entries.insert(key, translation.to_string());
    }

    /// Check for a key without touching the statistics
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.store.read().entries.contains_key(key)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            entries: self.len(),
        }
    }

    /// Clear the cache
    pub fn clear(&self) {
        let mut store = self.store.write();
        store.entries.clear();
        store.order.clear();

        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);

        debug!("Translation cache cleared");
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.store.read().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.store.read().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enable or disable the cache
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, true)
    }
}
