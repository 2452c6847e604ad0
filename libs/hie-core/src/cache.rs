//! Read-through cache for reference metadata
//!
//! One `MetadataCache` is constructed at startup and shared (via `Arc`) by
//! every component that reads concepts, concept sets, assigning authorities
//! or entities. Entries expire a fixed time after they were populated and
//! the least recently used entry is evicted once the size bound is reached.
//!
//! Keys are plain strings. An id string and a mnemonic naming the same
//! record are unrelated keys; populating one does not populate the other.
//! Negative lookups are never cached.

use crate::error::Result;
use hie_models::{AssigningAuthority, Concept, ConceptSet, EntityRecord, ReferenceTerm};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Cache sizing and expiration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of an entry from the moment it was populated
    pub ttl_seconds: u64,
    /// Maximum number of entries before LRU eviction
    pub capacity: usize,
    /// Concurrent misses on the same key share one fetch
    pub single_flight: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 30 * 60,
            capacity: 10_000,
            single_flight: true,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// A value held by the cache
#[derive(Debug, Clone)]
pub enum CachedRecord {
    Concept(Arc<Concept>),
    ConceptSet(Arc<ConceptSet>),
    AssigningAuthority(Arc<AssigningAuthority>),
    ReferenceTerm(Arc<ReferenceTerm>),
    Entity(Arc<EntityRecord>),
}

/// Record types that can live in the cache
pub trait Cacheable: Send + Sync + Sized + 'static {
    fn into_cached(value: Arc<Self>) -> CachedRecord;

    /// `None` when the record under the key is of another type
    fn from_cached(record: &CachedRecord) -> Option<Arc<Self>>;
}

impl Cacheable for Concept {
    fn into_cached(value: Arc<Self>) -> CachedRecord {
        CachedRecord::Concept(value)
    }

    fn from_cached(record: &CachedRecord) -> Option<Arc<Self>> {
        match record {
            CachedRecord::Concept(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl Cacheable for ConceptSet {
    fn into_cached(value: Arc<Self>) -> CachedRecord {
        CachedRecord::ConceptSet(value)
    }

    fn from_cached(record: &CachedRecord) -> Option<Arc<Self>> {
        match record {
            CachedRecord::ConceptSet(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl Cacheable for AssigningAuthority {
    fn into_cached(value: Arc<Self>) -> CachedRecord {
        CachedRecord::AssigningAuthority(value)
    }

    fn from_cached(record: &CachedRecord) -> Option<Arc<Self>> {
        match record {
            CachedRecord::AssigningAuthority(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl Cacheable for ReferenceTerm {
    fn into_cached(value: Arc<Self>) -> CachedRecord {
        CachedRecord::ReferenceTerm(value)
    }

    fn from_cached(record: &CachedRecord) -> Option<Arc<Self>> {
        match record {
            CachedRecord::ReferenceTerm(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl Cacheable for EntityRecord {
    fn into_cached(value: Arc<Self>) -> CachedRecord {
        CachedRecord::Entity(value)
    }

    fn from_cached(record: &CachedRecord) -> Option<Arc<Self>> {
        match record {
            CachedRecord::Entity(value) => Some(value.clone()),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    record: CachedRecord,
    populated_at: Instant,
}

/// Counters for instrumentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of times a fetch function was invoked
    pub fetches: u64,
}

type LoadGate = Arc<tokio::sync::Mutex<()>>;

#[derive(Debug)]
pub struct MetadataCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    loading: Mutex<HashMap<String, LoadGate>>,
    ttl: Duration,
    single_flight: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
}

impl MetadataCache {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            loading: Mutex::new(HashMap::new()),
            ttl: config.ttl(),
            single_flight: config.single_flight,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
        }
    }

    /// Cached value under `key`, if present, unexpired and of type `T`
    pub fn get<T: Cacheable>(&self, key: &str) -> Option<Arc<T>> {
        let found = self.peek::<T>(key);
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn insert<T: Cacheable>(&self, key: impl Into<String>, value: Arc<T>) {
        let entry = CacheEntry {
            record: T::into_cached(value),
            populated_at: Instant::now(),
        };
        lock(&self.entries).put(key.into(), entry);
    }

    /// Drop the entry under `key`; returns whether one existed
    pub fn remove(&self, key: &str) -> bool {
        lock(&self.entries).pop(key).is_some()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
        }
    }

    /// Return the cached value under `key`, or run `fetch` and cache what it finds.
    ///
    /// `fetch` resolves to `Ok(None)` when the remote service has no matching
    /// active record; that outcome is returned as-is and not cached. Errors
    /// from `fetch` propagate and leave the cache untouched.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> Result<Option<Arc<T>>>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        if let Some(hit) = self.get::<T>(key) {
            tracing::trace!(key, "metadata cache hit");
            return Ok(Some(hit));
        }

        if !self.single_flight {
            return self.load(key, fetch).await;
        }

        let gate = self.gate(key);
        let guard = gate.lock().await;
        // Populated by a concurrent caller while we waited
        let result = match self.peek::<T>(key) {
            Some(hit) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(hit))
            }
            None => self.load(key, fetch).await,
        };
        drop(guard);
        self.release_gate(key, &gate);
        result
    }

    async fn load<T, F, Fut>(&self, key: &str, fetch: F) -> Result<Option<Arc<T>>>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key, "metadata cache miss, fetching");

        match fetch().await? {
            Some(value) => {
                let value = Arc::new(value);
                self.insert(key, value.clone());
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn peek<T: Cacheable>(&self, key: &str) -> Option<Arc<T>> {
        let mut entries = lock(&self.entries);
        let expired = match entries.get(key) {
            Some(entry) if entry.populated_at.elapsed() < self.ttl => {
                return T::from_cached(&entry.record);
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn gate(&self, key: &str) -> LoadGate {
        lock(&self.loading)
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn release_gate(&self, key: &str, gate: &LoadGate) {
        let mut loading = lock(&self.loading);
        // Only the map and this caller still hold it
        if Arc::strong_count(gate) <= 2 {
            loading.remove(key);
        }
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::AtomicUsize;
    use uuid::Uuid;

    fn authority(domain: &str) -> AssigningAuthority {
        AssigningAuthority {
            id: Uuid::new_v4(),
            name: format!("{domain} registry"),
            domain_name: domain.to_string(),
            oid: None,
            url: None,
            description: None,
            validation_regex: None,
            obsoletion_time: None,
        }
    }

    #[tokio::test]
    async fn test_cold_key_fetches_once_then_hits() {
        let cache = MetadataCache::default();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch("NHID", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Some(authority("NHID")))
            })
            .await
            .unwrap()
            .unwrap();

        let second = cache
            .get_or_fetch::<AssigningAuthority, _, _>("NHID", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().fetches, 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_negative_results_are_not_cached() {
        let cache = MetadataCache::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let found = cache
                .get_or_fetch::<Concept, _, _>("Missing", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                })
                .await
                .unwrap();
            assert!(found.is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_errors_propagate_and_leave_cache_empty() {
        let cache = MetadataCache::default();
        let err = cache
            .get_or_fetch::<Concept, _, _>("Parent", || async {
                Err(Error::from(hie_client::Error::Service("unavailable".into())))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RemoteService(_)));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let cache = MetadataCache::new(&CacheConfig {
            ttl_seconds: 0,
            ..CacheConfig::default()
        });
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_fetch("NHID", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(authority("NHID")))
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_identity_and_mnemonic_keys_are_independent() {
        let cache = MetadataCache::default();
        let record = Arc::new(authority("NHID"));
        cache.insert(record.id.to_string(), record.clone());

        assert!(cache.get::<AssigningAuthority>(&record.id.to_string()).is_some());
        assert!(cache.get::<AssigningAuthority>("NHID").is_none());
    }

    #[test]
    fn test_type_mismatch_is_a_miss() {
        let cache = MetadataCache::default();
        cache.insert("NHID", Arc::new(authority("NHID")));

        assert!(cache.get::<Concept>("NHID").is_none());
        assert!(cache.get::<AssigningAuthority>("NHID").is_some());
    }

    #[test]
    fn test_capacity_bound_evicts_least_recently_used() {
        let cache = MetadataCache::new(&CacheConfig {
            capacity: 2,
            ..CacheConfig::default()
        });
        cache.insert("a", Arc::new(authority("A")));
        cache.insert("b", Arc::new(authority("B")));
        assert!(cache.get::<AssigningAuthority>("a").is_some());
        cache.insert("c", Arc::new(authority("C")));

        assert_eq!(cache.len(), 2);
        assert!(cache.get::<AssigningAuthority>("a").is_some());
        assert!(cache.get::<AssigningAuthority>("b").is_none());
    }

    #[tokio::test]
    async fn test_single_flight_shares_one_fetch() {
        let cache = Arc::new(MetadataCache::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_fetch("NHID", || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(Some(authority("NHID")))
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().unwrap().is_some());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.fetches, 1);
        // Every waiter found the shared result
        assert_eq!(stats.hits, 7);
    }

    #[tokio::test]
    async fn test_without_single_flight_concurrent_misses_each_fetch() {
        let cache = Arc::new(MetadataCache::new(&CacheConfig {
            single_flight: false,
            ..CacheConfig::default()
        }));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_fetch("NHID", || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(Some(authority("NHID")))
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().unwrap().is_some());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(cache.stats().fetches, 4);
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.len(), 1);
        assert!(cache.get::<AssigningAuthority>("NHID").is_some());
    }
}
