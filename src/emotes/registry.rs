//! Emote registry: authoritative list plus a TTL-bounded name index.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;

use super::model::Emote;
use super::normalize::normalize;
use super::upstream::EmoteSource;

/// Point-in-time registry counters, exposed through `/stats`.
#[derive(Clone, Debug, Serialize)]
pub struct RegistryStats {
    /// Emotes in the authoritative list.
    pub emotes: usize,
    /// Entries currently held by the name cache.
    pub cached_names: usize,
    /// Lookups answered from the cache.
    pub cache_hits: u64,
    /// Lookups that fell back to scanning the list.
    pub scan_fallbacks: u64,
    /// When the last load completed, if one has.
    pub last_loaded: Option<DateTime<Utc>>,
}

/// In-memory emote registry.
///
/// The merged list from the most recent load is authoritative and replaced
/// wholesale on every load; the name cache is an accelerator whose misses
/// fall back to a linear scan of the list. An instance is owned by the
/// server state and shared by reference; tests construct their own.
///
/// Readers are never blocked behind a load: they observe whichever list and
/// cache state exists when they run. Overlapping loads race and the last
/// assignment wins.
pub struct EmoteRegistry {
    source: Arc<dyn EmoteSource>,
    set_ids: Vec<String>,
    all: RwLock<Arc<Vec<Emote>>>,
    by_name: TtlCache<String, Emote>,
    last_loaded: RwLock<Option<DateTime<Utc>>>,
    cache_hits: AtomicU64,
    scan_fallbacks: AtomicU64,
}

impl EmoteRegistry {
    /// Create an empty registry over the given source and set list.
    pub fn new(source: Arc<dyn EmoteSource>, set_ids: Vec<String>, cache_ttl: Duration) -> Self {
        Self {
            source,
            set_ids,
            all: RwLock::new(Arc::new(Vec::new())),
            by_name: TtlCache::new(cache_ttl),
            last_loaded: RwLock::new(None),
            cache_hits: AtomicU64::new(0),
            scan_fallbacks: AtomicU64::new(0),
        }
    }

    /// Snapshot of the full emote list. Cheap: clones an `Arc`, not the list.
    pub fn all(&self) -> Arc<Vec<Emote>> {
        Arc::clone(&self.all.read())
    }

    /// Fetch every configured set and replace the registry contents.
    ///
    /// Sets are fetched concurrently and joined; a failed set contributes
    /// nothing (logged), so one bad set never sinks the others. The merged
    /// order follows the configured set order, then upstream order within
    /// each set, regardless of completion order.
    pub async fn load_all(&self) -> Vec<Emote> {
        if self.set_ids.is_empty() {
            warn!("No emote sets configured, loading nothing");
            return Vec::new();
        }

        let fetches = self
            .set_ids
            .iter()
            .map(|set_id| self.source.fetch_set(set_id));
        let results = future::join_all(fetches).await;

        let mut emotes = Vec::new();
        for (set_id, result) in self.set_ids.iter().zip(results) {
            match result {
                Ok(records) => {
                    let before = emotes.len();
                    emotes.extend(records.into_iter().filter_map(normalize));
                    debug!("Set {} contributed {} emotes", set_id, emotes.len() - before);
                }
                Err(err) => {
                    warn!("Fetching set {} failed ({}), contributing nothing", set_id, err);
                }
            }
        }

        *self.all.write() = Arc::new(emotes.clone());
        *self.last_loaded.write() = Some(Utc::now());

        // Eager keying of the lookup cache. Later duplicates overwrite
        // earlier ones, so the last configured set wins a name collision.
        for emote in &emotes {
            self.by_name.insert(emote.name.to_lowercase(), emote.clone());
        }

        info!(
            "Emote registry loaded: {} emotes from {} sets",
            emotes.len(),
            self.set_ids.len()
        );
        emotes
    }

    /// Flush the name cache entirely, then reload everything.
    ///
    /// The one path that can shrink the registry: emotes removed upstream are
    /// gone once this returns.
    pub async fn refresh(&self) -> Vec<Emote> {
        self.by_name.invalidate_all();
        self.load_all().await
    }

    /// Look up an emote by display name, case-insensitively.
    ///
    /// An empty or all-whitespace name short-circuits to `None` without
    /// touching the cache or scanning. An unexpired cache entry wins;
    /// otherwise the authoritative list is scanned and the match re-cached.
    pub fn find(&self, name: &str) -> Option<Emote> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }

        if let Some(hit) = self.by_name.get(&key) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!("Emote '{}' served from name cache", key);
            return Some(hit);
        }

        self.scan_fallbacks.fetch_add(1, Ordering::Relaxed);
        let all = self.all();
        // Scan from the back so a duplicated name resolves to the same emote
        // the load-time cache keying picked (the later set wins).
        let found = all
            .iter()
            .rev()
            .find(|emote| emote.name.to_lowercase() == key)
            .cloned()?;

        self.by_name.insert(key, found.clone());
        Some(found)
    }

    /// Current counters and sizes.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            emotes: self.all.read().len(),
            cached_names: self.by_name.entry_count(),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            scan_fallbacks: self.scan_fallbacks.load(Ordering::Relaxed),
            last_loaded: *self.last_loaded.read(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::StatusCode;

    use super::*;
    use crate::emotes::image::{ImageFormat, ImageSize};
    use crate::emotes::upstream::{RawEmote, UpstreamError};

    /// In-memory source backed by a mutable map of set ids to records.
    struct StubSource {
        sets: RwLock<HashMap<String, Vec<RawEmote>>>,
        failing: HashSet<String>,
    }

    impl StubSource {
        fn new(sets: Vec<(&str, Vec<RawEmote>)>) -> Self {
            Self {
                sets: RwLock::new(
                    sets.into_iter()
                        .map(|(id, records)| (id.to_string(), records))
                        .collect(),
                ),
                failing: HashSet::new(),
            }
        }

        fn with_failing(mut self, set_id: &str) -> Self {
            self.failing.insert(set_id.to_string());
            self
        }

        fn replace(&self, set_id: &str, records: Vec<RawEmote>) {
            self.sets.write().insert(set_id.to_string(), records);
        }
    }

    #[async_trait]
    impl EmoteSource for StubSource {
        async fn fetch_set(&self, set_id: &str) -> Result<Vec<RawEmote>, UpstreamError> {
            if self.failing.contains(set_id) {
                return Err(UpstreamError::Status {
                    url: format!("stub://{}", set_id),
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                });
            }
            Ok(self.sets.read().get(set_id).cloned().unwrap_or_default())
        }

        async fn fetch_image(
            &self,
            _emote_id: &str,
            _size: ImageSize,
            _format: ImageFormat,
        ) -> Result<Bytes, UpstreamError> {
            Ok(Bytes::from_static(b"stub"))
        }
    }

    fn raw(id: &str, name: &str) -> RawEmote {
        RawEmote {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn registry_over(source: StubSource, set_ids: &[&str], ttl: Duration) -> EmoteRegistry {
        EmoteRegistry::new(
            Arc::new(source),
            set_ids.iter().map(|id| id.to_string()).collect(),
            ttl,
        )
    }

    const LONG_TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_find_is_case_insensitive() {
        let source = StubSource::new(vec![("a", vec![raw("e1", "FeelsDankMan")])]);
        let registry = registry_over(source, &["a"], LONG_TTL);
        registry.load_all().await;

        let lower = registry.find("feelsdankman").unwrap();
        let upper = registry.find("FEELSDANKMAN").unwrap();

        assert_eq!(lower.id, "e1");
        assert_eq!(upper.id, "e1");
    }

    #[tokio::test]
    async fn test_failed_set_degrades_to_empty() {
        let source = StubSource::new(vec![(
            "a",
            vec![raw("e1", "One"), raw("e2", "Two"), raw("e3", "Three")],
        )])
        .with_failing("b");
        let registry = registry_over(source, &["a", "b"], LONG_TTL);

        let loaded = registry.load_all().await;

        assert_eq!(loaded.len(), 3);
        assert!(registry.find("two").is_some());
    }

    #[tokio::test]
    async fn test_malformed_record_is_dropped() {
        let source = StubSource::new(vec![(
            "a",
            vec![raw("e1", "One"), raw("", "NoId"), raw("e2", "Two")],
        )]);
        let registry = registry_over(source, &["a"], LONG_TTL);

        let loaded = registry.load_all().await;

        assert_eq!(loaded.len(), 2);
        assert!(registry.find("NoId").is_none());
    }

    #[tokio::test]
    async fn test_name_collision_last_configured_set_wins() {
        let source = StubSource::new(vec![
            ("a", vec![raw("a1", "X")]),
            ("b", vec![raw("b1", "X")]),
        ]);
        let registry = registry_over(source, &["a", "b"], Duration::from_millis(200));
        registry.load_all().await;

        // Warm cache resolves the collision to the later set.
        assert_eq!(registry.find("x").unwrap().id, "b1");

        // So does the scan path once the cached entry has expired.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(registry.find("x").unwrap().id, "b1");
        assert_eq!(registry.stats().scan_fallbacks, 1);
    }

    #[tokio::test]
    async fn test_merge_preserves_configured_order() {
        let source = StubSource::new(vec![
            ("a", vec![raw("a1", "First"), raw("a2", "Second")]),
            ("b", vec![raw("b1", "Third")]),
        ]);
        let registry = registry_over(source, &["a", "b"], LONG_TTL);
        registry.load_all().await;

        let names: Vec<String> = registry.all().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_expired_cache_falls_back_to_scan_and_repopulates() {
        let source = StubSource::new(vec![("a", vec![raw("e1", "Kappa")])]);
        let registry = registry_over(source, &["a"], Duration::from_millis(200));
        registry.load_all().await;

        // Let the eagerly-cached entry expire.
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(registry.find("kappa").unwrap().id, "e1");
        let stats = registry.stats();
        assert_eq!(stats.scan_fallbacks, 1);

        // The scan re-cached the entry, so the next lookup hits the cache.
        assert_eq!(registry.find("kappa").unwrap().id, "e1");
        let stats = registry.stats();
        assert_eq!(stats.scan_fallbacks, 1);
        assert_eq!(stats.cache_hits, 1);
    }

    #[tokio::test]
    async fn test_empty_name_short_circuits_without_scanning() {
        let source = StubSource::new(vec![("a", vec![raw("e1", "Kappa")])]);
        let registry = registry_over(source, &["a"], LONG_TTL);
        registry.load_all().await;

        assert!(registry.find("").is_none());
        assert!(registry.find("   ").is_none());

        let stats = registry.stats();
        assert_eq!(stats.scan_fallbacks, 0);
        assert_eq!(stats.cache_hits, 0);
    }

    #[tokio::test]
    async fn test_empty_set_list_loads_nothing() {
        let source = StubSource::new(Vec::new());
        let registry = registry_over(source, &[], LONG_TTL);

        assert!(registry.load_all().await.is_empty());
        assert_eq!(registry.stats().emotes, 0);
    }

    #[tokio::test]
    async fn test_find_before_first_load_is_not_found() {
        let source = StubSource::new(vec![("a", vec![raw("e1", "Kappa")])]);
        let registry = registry_over(source, &["a"], LONG_TTL);

        assert!(registry.find("kappa").is_none());
    }

    #[tokio::test]
    async fn test_refresh_drops_removed_emotes() {
        let source = Arc::new(StubSource::new(vec![(
            "a",
            vec![raw("e1", "Stays"), raw("e2", "Goes")],
        )]));
        let registry =
            EmoteRegistry::new(source.clone(), vec!["a".to_string()], LONG_TTL);
        registry.load_all().await;
        assert_eq!(registry.all().len(), 2);
        assert!(registry.find("goes").is_some());

        // Upstream dropped one emote; refresh must both shrink the list and
        // forget the cached name.
        source.replace("a", vec![raw("e1", "Stays")]);
        registry.refresh().await;

        assert_eq!(registry.all().len(), 1);
        assert!(registry.find("goes").is_none());
        assert!(registry.find("stays").is_some());
    }
}
