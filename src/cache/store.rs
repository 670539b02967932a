//! TTL-bounded lookup cache with explicit per-entry timestamps.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A cached value together with the moment it was inserted.
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe cache with a fixed time-to-live per entry.
///
/// Every entry carries its own insertion timestamp; a read past the TTL
/// treats the entry as absent and evicts it on the spot. Inserting an
/// existing key refreshes its timestamp. There is no size bound and no LRU:
/// the keyspace is bounded by the loaded emote list.
///
/// Cloning is cheap and shares the same underlying map.
pub struct TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    entries: Arc<DashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

// Manual Clone implementation that doesn't require K: Clone, V: Clone
impl<K, V> Clone for TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            ttl: self.ttl,
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new cache whose entries expire `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Get a value from the cache.
    ///
    /// Returns `Some(value)` only while the entry is younger than the TTL;
    /// an expired entry is removed and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
            // Expired: release the shard guard before removing.
            drop(entry);
            self.entries.remove(key);
        }
        None
    }

    /// Insert a key-value pair, stamping it with the current time.
    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Remove all entries.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Number of stored entries.
    ///
    /// Expired entries are evicted lazily on read, so this may briefly count
    /// entries that would miss if looked up.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("entry_count", &self.entries.len())
            .finish()
    }
}
