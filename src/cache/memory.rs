//! In-process cache variants.
//!
//! Both variants share [`TtlStore`], a map whose entries carry an optional
//! expiry instant. Expired entries are evicted lazily on lookup, and swept in
//! bulk every [`CLEANUP_INTERVAL`] inserts so one-off keys do not pile up.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use bingx_api_client::cache::TtlStore;
//!
//! let mut store: TtlStore<String, i64> = TtlStore::new();
//!
//! store.insert("O123".to_string(), 1234567890, Some(Duration::from_secs(300)));
//! store.insert("pinned".to_string(), 1, None);
//!
//! assert_eq!(store.get(&"O123".to_string()), Some(&1234567890));
//!
//! store.remove(&"O123".to_string());
//! assert!(store.get(&"O123".to_string()).is_none());
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;

use crate::cache::{AsyncCache, Cache, CacheError};

/// Inserts between two sweeps of expired entries.
pub const CLEANUP_INTERVAL: usize = 256;

/// A map whose entries expire individually.
///
/// An entry inserted without a TTL never expires and leaves only through
/// [`TtlStore::remove`] or [`TtlStore::clear`].
#[derive(Debug)]
pub struct TtlStore<K, V> {
    entries: HashMap<K, (V, Option<Instant>)>,
    inserts_since_cleanup: usize,
}

impl<K, V> TtlStore<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            inserts_since_cleanup: 0,
        }
    }

    /// Insert a value, replacing any previous entry for the key.
    ///
    /// Every [`CLEANUP_INTERVAL`]th insert first sweeps expired entries.
    pub fn insert(&mut self, key: K, value: V, ttl: Option<Duration>) {
        self.inserts_since_cleanup += 1;
        if self.inserts_since_cleanup >= CLEANUP_INTERVAL {
            self.cleanup();
        }
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.entries.insert(key, (value, expires_at));
    }

    /// Get a live value, evicting the entry if it has expired.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.is_expired(key) {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|(value, _)| value)
    }

    /// Remove an entry, returning its value if it was still live.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.entries
            .remove(key)
            .and_then(|(value, expires_at)| match expires_at {
                Some(at) if at <= now => None,
                _ => Some(value),
            })
    }

    /// Remove all expired entries.
    pub fn cleanup(&mut self) {
        self.inserts_since_cleanup = 0;
        let now = Instant::now();
        self.entries
            .retain(|_, (_, expires_at)| expires_at.is_none_or(|at| at > now));
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that haven't expired.
    pub fn active_count(&self) -> usize {
        let now = Instant::now();
        self.entries
            .values()
            .filter(|(_, expires_at)| expires_at.is_none_or(|at| at > now))
            .count()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_expired(&self, key: &K) -> bool {
        matches!(
            self.entries.get(key),
            Some((_, Some(at))) if *at <= Instant::now()
        )
    }
}

impl<K, V> Default for TtlStore<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe in-memory cache for the blocking client.
#[derive(Debug, Default)]
pub struct SyncMemoryCache {
    store: Mutex<TtlStore<String, Value>>,
}

impl SyncMemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.store.lock().active_count()
    }

    /// Check if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.store.lock().clear();
    }
}

impl Cache for SyncMemoryCache {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.store.lock().get(&key.to_string()).cloned())
    }

    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.store.lock().insert(key.to_string(), value.clone(), ttl);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.lock().remove(&key.to_string());
        Ok(())
    }
}

/// In-memory cache whose lock suspends the task instead of blocking the thread.
#[derive(Debug, Default)]
pub struct AsyncMemoryCache {
    store: tokio::sync::Mutex<TtlStore<String, Value>>,
}

impl AsyncMemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        self.store.lock().await.active_count()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.store.lock().await.clear();
    }
}

impl AsyncCache for AsyncMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.store.lock().await.get(&key.to_string()).cloned())
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.store
            .lock()
            .await
            .insert(key.to_string(), value.clone(), ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.lock().await.remove(&key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    #[test]
    fn test_insert_and_get() {
        let mut store: TtlStore<String, i32> = TtlStore::new();

        store.insert("key1".to_string(), 100, Some(Duration::from_secs(60)));
        assert_eq!(store.get(&"key1".to_string()), Some(&100));
        assert_eq!(store.get(&"key2".to_string()), None);
    }

    #[test]
    fn test_remove() {
        let mut store: TtlStore<String, i32> = TtlStore::new();

        store.insert("key1".to_string(), 100, Some(Duration::from_secs(60)));
        assert_eq!(store.remove(&"key1".to_string()), Some(100));
        assert_eq!(store.get(&"key1".to_string()), None);
    }

    #[test]
    fn test_expiration_evicts_lazily() {
        let mut store: TtlStore<String, i32> = TtlStore::new();

        store.insert("key1".to_string(), 100, Some(Duration::from_millis(50)));
        assert!(store.get(&"key1".to_string()).is_some());

        thread::sleep(Duration::from_millis(60));
        assert_eq!(store.len(), 1);
        assert!(store.get(&"key1".to_string()).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_entries_without_ttl_never_expire() {
        let mut store: TtlStore<String, i32> = TtlStore::new();

        store.insert("pinned".to_string(), 1, None);
        store.insert("short".to_string(), 2, Some(Duration::from_millis(20)));
        thread::sleep(Duration::from_millis(30));

        store.cleanup();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&"pinned".to_string()), Some(&1));
    }

    #[test]
    fn test_cleanup() {
        let mut store: TtlStore<String, i32> = TtlStore::new();

        store.insert("key1".to_string(), 100, Some(Duration::from_millis(50)));
        store.insert("key2".to_string(), 200, Some(Duration::from_millis(50)));
        assert_eq!(store.len(), 2);

        thread::sleep(Duration::from_millis(60));

        // Entry still in the map but expired
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_count(), 0);

        store.cleanup();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_inserts_sweep_expired_keys() {
        let mut store: TtlStore<String, i32> = TtlStore::new();

        for i in 0..CLEANUP_INTERVAL - 2 {
            store.insert(format!("one-off-{i}"), 1, Some(Duration::from_millis(10)));
        }
        store.insert("pinned".to_string(), 2, None);
        assert_eq!(store.len(), CLEANUP_INTERVAL - 1);

        thread::sleep(Duration::from_millis(20));
        store.insert("fresh".to_string(), 3, Some(Duration::from_secs(60)));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&"pinned".to_string()), Some(&2));
        assert_eq!(store.get(&"fresh".to_string()), Some(&3));
    }

    #[test]
    fn test_sync_memory_cache_does_not_grow_with_expired_keys() {
        let cache = SyncMemoryCache::new();
        let value = json!({"code": 0});

        for i in 0..CLEANUP_INTERVAL {
            cache
                .set(&format!("GET:p:symbol=S{i}"), &value, Some(Duration::from_millis(5)))
                .unwrap();
        }
        thread::sleep(Duration::from_millis(15));
        for i in 0..CLEANUP_INTERVAL {
            cache
                .set(&format!("GET:p:symbol=T{i}"), &value, Some(Duration::from_secs(60)))
                .unwrap();
        }

        assert!(cache.store.lock().len() <= CLEANUP_INTERVAL + 1);
    }

    #[test]
    fn test_sync_memory_cache_roundtrip() {
        let cache = SyncMemoryCache::new();
        let value = json!({"code": 0, "data": {"serverTime": 1}});

        assert!(cache.get("k").unwrap().is_none());
        cache.set("k", &value, Some(Duration::from_secs(60))).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(value));
        assert_eq!(cache.len(), 1);

        cache.delete("k").unwrap();
        assert!(cache.get("k").unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_async_memory_cache_expiry() {
        let cache = AsyncMemoryCache::new();
        let value = json!({"code": 0});

        cache.set("k", &value, Some(Duration::from_millis(20))).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(value));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("k").await.unwrap().is_none());
        assert_eq!(cache.len().await, 0);
    }
}
