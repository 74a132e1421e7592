//! Cache configuration shared between clients.
//!
//! A [`CacheConfig`] holds the active cache backend (or none) and the unsafe
//! caching toggle. Clients receive one at construction; unless told otherwise
//! they use the process-wide instance returned by [`CacheConfig::global`],
//! which starts with a sync in-memory cache and unsafe caching disabled.
//!
//! Swapping the backend affects calls that start afterwards. Calls already
//! past their cache lookup keep the backend they snapshotted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::cache::{CacheBackend, CacheError, CacheKind, RedisSettings, SyncMemoryCache};

static GLOBAL: LazyLock<Arc<CacheConfig>> = LazyLock::new(|| Arc::new(CacheConfig::new()));

/// The active cache backend and caching policy.
#[derive(Debug)]
pub struct CacheConfig {
    backend: RwLock<Option<CacheBackend>>,
    unsafe_caching: AtomicBool,
}

impl CacheConfig {
    /// A config with a fresh sync in-memory cache and unsafe caching off.
    pub fn new() -> Self {
        Self::with_backend(CacheBackend::SyncMemory(Arc::new(SyncMemoryCache::new())))
    }

    /// A config with caching turned off.
    pub fn disabled() -> Self {
        Self {
            backend: RwLock::new(None),
            unsafe_caching: AtomicBool::new(false),
        }
    }

    /// A config using the given backend.
    pub fn with_backend(backend: CacheBackend) -> Self {
        Self {
            backend: RwLock::new(Some(backend)),
            unsafe_caching: AtomicBool::new(false),
        }
    }

    /// The process-wide config used by clients built without an explicit one.
    pub fn global() -> Arc<CacheConfig> {
        Arc::clone(&GLOBAL)
    }

    /// Replace the backend with a fresh cache of the given kind.
    pub fn set_cache(&self, kind: CacheKind, settings: &RedisSettings) -> Result<(), CacheError> {
        let backend = CacheBackend::create(kind, settings)?;
        tracing::debug!(cache = %kind, "cache backend replaced");
        self.set_backend(Some(backend));
        Ok(())
    }

    /// Replace the backend, or turn caching off with `None`.
    pub fn set_backend(&self, backend: Option<CacheBackend>) {
        *self.backend.write() = backend;
    }

    /// Snapshot of the current backend.
    pub fn backend(&self) -> Option<CacheBackend> {
        self.backend.read().clone()
    }

    /// Allow caching of POST, PUT and DELETE responses.
    pub fn enable_unsafe_cache(&self) {
        self.unsafe_caching.store(true, Ordering::SeqCst);
    }

    /// Restrict caching to GET responses.
    pub fn disable_unsafe_cache(&self) {
        self.unsafe_caching.store(false, Ordering::SeqCst);
    }

    /// Whether non-GET responses may be cached.
    pub fn is_unsafe_cache_enabled(&self) -> bool {
        self.unsafe_caching.load(Ordering::SeqCst)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the process-wide cache with a fresh cache of the given kind.
pub fn set_cache(kind: CacheKind, settings: &RedisSettings) -> Result<(), CacheError> {
    GLOBAL.set_cache(kind, settings)
}

/// Replace the process-wide cache backend, or turn caching off with `None`.
pub fn set_cache_backend(backend: Option<CacheBackend>) {
    GLOBAL.set_backend(backend);
}

/// Turn process-wide caching off.
pub fn clear_cache() {
    GLOBAL.set_backend(None);
}

/// Allow the process-wide cache to store POST, PUT and DELETE responses.
pub fn enable_unsafe_cache() {
    GLOBAL.enable_unsafe_cache();
}

/// Restrict the process-wide cache to GET responses.
pub fn disable_unsafe_cache() {
    GLOBAL.disable_unsafe_cache();
}

/// Whether the process-wide cache may store non-GET responses.
pub fn is_unsafe_cache_enabled() -> bool {
    GLOBAL.is_unsafe_cache_enabled()
}
