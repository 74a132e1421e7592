//! Response caching.
//!
//! Four cache variants are available: blocking or async, in-process memory or
//! Redis. The active variant lives in a [`CacheConfig`]; clients read it on
//! every request and take a snapshot of the backend for the duration of the
//! call.
//!
//! Entries hold the validated JSON payload of a response, keyed by
//! [`build_key`]. A `None` TTL stores an entry that never expires.
//!
//! # Example
//!
//! ```rust,no_run
//! use bingx_api_client::cache::{self, CacheKind, RedisSettings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Swap the process-wide cache for an async Redis cache.
//! cache::set_cache(CacheKind::AsyncRedis, &RedisSettings::default())?;
//!
//! // Allow POST/PUT/DELETE responses to be cached too.
//! cache::enable_unsafe_cache();
//! # Ok(())
//! # }
//! ```

mod config;
mod key;
mod memory;
mod redis;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

pub use self::config::{
    CacheConfig, clear_cache, disable_unsafe_cache, enable_unsafe_cache, is_unsafe_cache_enabled,
    set_cache, set_cache_backend,
};
pub use self::key::build_key;
pub use self::memory::{AsyncMemoryCache, CLEANUP_INTERVAL, SyncMemoryCache, TtlStore};
pub use self::redis::{AsyncRedisCache, RedisSettings, SyncRedisCache};

/// Errors raised by a cache backend.
///
/// Request paths never surface these: a failed lookup counts as a miss and a
/// failed store is logged and dropped.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Redis command or connection failure
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    /// Stored value could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend did not answer in time
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),

    /// The operation is not available for this backend
    #[error("Unsupported cache operation: {0}")]
    Unsupported(String),
}

/// A cache whose operations block the calling thread.
pub trait Cache: Send + Sync {
    /// Look up a live entry.
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store an entry, replacing any previous one.
    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Remove an entry if present.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// A cache whose operations suspend the calling task.
pub trait AsyncCache: Send + Sync {
    /// Look up a live entry.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, CacheError>> + Send;

    /// Store an entry, replacing any previous one.
    fn set(
        &self,
        key: &str,
        value: &Value,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Remove an entry if present.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send;
}

/// Selects one of the four cache variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// Process-local map behind a blocking lock
    SyncMemory,
    /// Redis over a blocking connection
    SyncRedis,
    /// Process-local map behind an async lock
    AsyncMemory,
    /// Redis over a multiplexed async connection
    AsyncRedis,
}

impl CacheKind {
    /// Whether this variant's operations suspend instead of block.
    pub fn is_async(&self) -> bool {
        matches!(self, CacheKind::AsyncMemory | CacheKind::AsyncRedis)
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CacheKind::SyncMemory => "sync-memory",
            CacheKind::SyncRedis => "sync-redis",
            CacheKind::AsyncMemory => "async-memory",
            CacheKind::AsyncRedis => "async-redis",
        };
        f.write_str(s)
    }
}

/// A shared handle to a concrete cache instance.
///
/// Cloning is cheap and yields a handle to the same storage.
#[derive(Debug, Clone)]
pub enum CacheBackend {
    SyncMemory(Arc<SyncMemoryCache>),
    SyncRedis(Arc<SyncRedisCache>),
    AsyncMemory(Arc<AsyncMemoryCache>),
    AsyncRedis(Arc<AsyncRedisCache>),
}

impl CacheBackend {
    /// Create a fresh cache of the given kind.
    ///
    /// Redis variants connect lazily, so this only fails on an invalid
    /// connection URL.
    pub fn create(kind: CacheKind, settings: &RedisSettings) -> Result<Self, CacheError> {
        Ok(match kind {
            CacheKind::SyncMemory => Self::SyncMemory(Arc::new(SyncMemoryCache::new())),
            CacheKind::SyncRedis => Self::SyncRedis(Arc::new(SyncRedisCache::new(settings)?)),
            CacheKind::AsyncMemory => Self::AsyncMemory(Arc::new(AsyncMemoryCache::new())),
            CacheKind::AsyncRedis => Self::AsyncRedis(Arc::new(AsyncRedisCache::new(settings)?)),
        })
    }

    /// The variant behind this handle.
    pub fn kind(&self) -> CacheKind {
        match self {
            Self::SyncMemory(_) => CacheKind::SyncMemory,
            Self::SyncRedis(_) => CacheKind::SyncRedis,
            Self::AsyncMemory(_) => CacheKind::AsyncMemory,
            Self::AsyncRedis(_) => CacheKind::AsyncRedis,
        }
    }

    /// Whether this backend's operations suspend instead of block.
    pub fn is_async(&self) -> bool {
        self.kind().is_async()
    }

    /// The blocking interface, if this is a sync variant.
    pub fn as_sync(&self) -> Option<&dyn Cache> {
        match self {
            Self::SyncMemory(cache) => Some(cache.as_ref()),
            Self::SyncRedis(cache) => Some(cache.as_ref()),
            Self::AsyncMemory(_) | Self::AsyncRedis(_) => None,
        }
    }

    /// Look up an entry from async code.
    ///
    /// Sync variants run inline on the current task.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        match self {
            Self::SyncMemory(cache) => Cache::get(cache.as_ref(), key),
            Self::SyncRedis(cache) => Cache::get(cache.as_ref(), key),
            Self::AsyncMemory(cache) => AsyncCache::get(cache.as_ref(), key).await,
            Self::AsyncRedis(cache) => AsyncCache::get(cache.as_ref(), key).await,
        }
    }

    /// Store an entry from async code.
    pub async fn set(
        &self,
        key: &str,
        value: &Value,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let ttl = normalize_ttl(ttl);
        match self {
            Self::SyncMemory(cache) => Cache::set(cache.as_ref(), key, value, ttl),
            Self::SyncRedis(cache) => Cache::set(cache.as_ref(), key, value, ttl),
            Self::AsyncMemory(cache) => AsyncCache::set(cache.as_ref(), key, value, ttl).await,
            Self::AsyncRedis(cache) => AsyncCache::set(cache.as_ref(), key, value, ttl).await,
        }
    }

    /// Remove an entry from async code.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            Self::SyncMemory(cache) => Cache::delete(cache.as_ref(), key),
            Self::SyncRedis(cache) => Cache::delete(cache.as_ref(), key),
            Self::AsyncMemory(cache) => AsyncCache::delete(cache.as_ref(), key).await,
            Self::AsyncRedis(cache) => AsyncCache::delete(cache.as_ref(), key).await,
        }
    }
}

impl From<Arc<SyncMemoryCache>> for CacheBackend {
    fn from(cache: Arc<SyncMemoryCache>) -> Self {
        Self::SyncMemory(cache)
    }
}

impl From<Arc<SyncRedisCache>> for CacheBackend {
    fn from(cache: Arc<SyncRedisCache>) -> Self {
        Self::SyncRedis(cache)
    }
}

impl From<Arc<AsyncMemoryCache>> for CacheBackend {
    fn from(cache: Arc<AsyncMemoryCache>) -> Self {
        Self::AsyncMemory(cache)
    }
}

impl From<Arc<AsyncRedisCache>> for CacheBackend {
    fn from(cache: Arc<AsyncRedisCache>) -> Self {
        Self::AsyncRedis(cache)
    }
}

/// A zero TTL is treated like no TTL: the entry never expires.
pub(crate) fn normalize_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|ttl| !ttl.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_flags() {
        assert!(!CacheKind::SyncMemory.is_async());
        assert!(!CacheKind::SyncRedis.is_async());
        assert!(CacheKind::AsyncMemory.is_async());
        assert!(CacheKind::AsyncRedis.is_async());
        assert_eq!(CacheKind::AsyncRedis.to_string(), "async-redis");
    }

    #[test]
    fn test_create_every_kind() {
        let settings = RedisSettings::default();
        for kind in [
            CacheKind::SyncMemory,
            CacheKind::SyncRedis,
            CacheKind::AsyncMemory,
            CacheKind::AsyncRedis,
        ] {
            let backend = CacheBackend::create(kind, &settings).unwrap();
            assert_eq!(backend.kind(), kind);
            assert_eq!(backend.as_sync().is_some(), !kind.is_async());
        }
    }

    #[test]
    fn test_normalize_ttl() {
        assert_eq!(normalize_ttl(None), None);
        assert_eq!(normalize_ttl(Some(Duration::ZERO)), None);
        assert_eq!(
            normalize_ttl(Some(Duration::from_secs(5))),
            Some(Duration::from_secs(5))
        );
    }

    #[tokio::test]
    async fn test_backend_dispatch_sync_variant_from_async() {
        let backend = CacheBackend::create(CacheKind::SyncMemory, &RedisSettings::default()).unwrap();
        let value = json!({"code": 0, "data": [1, 2, 3]});

        backend.set("k", &value, Some(Duration::ZERO)).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some(value));

        backend.delete("k").await.unwrap();
        assert!(backend.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_backend_dispatch_async_variant() {
        let backend = CacheBackend::create(CacheKind::AsyncMemory, &RedisSettings::default()).unwrap();
        let value = json!({"code": 0});

        backend.set("k", &value, None).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some(value));
    }
}
