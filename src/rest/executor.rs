//! The request pipeline shared by both clients.
//!
//! Every call runs the same steps:
//!
//! ```text
//! BUILD -> CACHE_LOOKUP? -> [hit: return] -> DISPATCH -> VALIDATE -> DECODE -> CACHE_STORE? -> return
//! ```
//!
//! The pipeline is generic over [`Transport`]; the transport's
//! [`DispatchMode`] decides how the cache backend may be used. Cache failures
//! never fail a request: a failed lookup is a miss and a failed store is
//! dropped, both with a warning.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{CredentialsProvider, SIGNATURE_PARAM, TimestampProvider, canonicalize, sign_request};
use crate::cache::{CacheBackend, CacheConfig, CacheError, normalize_ttl};
use crate::error::BingxError;
use crate::rest::decode::{Decoded, decode, validate};
use crate::rest::endpoints::API_KEY_HEADER;
use crate::rest::transport::{DispatchMode, PreparedRequest, Transport};
use crate::rest::RequestSpec;

/// Where an eligible request is looked up and stored.
struct CacheSlot {
    backend: CacheBackend,
    key: String,
    ttl: Option<Duration>,
}

/// Builds, signs, caches and decodes requests for one client.
pub(crate) struct Executor {
    pub(crate) base_url: String,
    pub(crate) credentials: Option<Arc<dyn CredentialsProvider>>,
    pub(crate) clock: Arc<dyn TimestampProvider>,
    pub(crate) cache_config: Arc<CacheConfig>,
    pub(crate) default_cache_ttl: Option<Duration>,
}

impl Executor {
    /// Build the outgoing request.
    ///
    /// Every request carries a fresh `timestamp`. Signed requests also get
    /// `signature` appended after the canonical query and the API key header.
    pub(crate) fn prepare(&self, spec: &RequestSpec) -> Result<PreparedRequest, BingxError> {
        let canonical = canonicalize(&spec.params, self.clock.timestamp_millis());
        let mut query = canonical.to_query_string();
        let mut headers = Vec::new();

        if spec.requires_signature {
            let credentials = self
                .credentials
                .as_ref()
                .ok_or(BingxError::MissingCredentials)?
                .get_credentials();

            let signature = match &spec.signature_override {
                Some(signer) => signer(&query),
                None => sign_request(credentials, &canonical)?,
            };
            query.push('&');
            query.push_str(SIGNATURE_PARAM);
            query.push('=');
            query.push_str(&signature);
            headers.push((API_KEY_HEADER, credentials.api_key.clone()));
        }

        let separator = if spec.path.starts_with('/') { "" } else { "/" };
        let url = Url::parse(&format!(
            "{}{separator}{}?{query}",
            self.base_url.trim_end_matches('/'),
            spec.path
        ))?;

        Ok(PreparedRequest {
            method: spec.method,
            url: url.into(),
            headers,
        })
    }

    /// Decide whether the request takes part in caching and snapshot the
    /// backend it will use.
    fn cache_slot(&self, spec: &RequestSpec, mode: DispatchMode) -> Option<CacheSlot> {
        if !spec.use_cache {
            return None;
        }
        if !spec.method.is_safe() && !self.cache_config.is_unsafe_cache_enabled() {
            debug!(
                method = %spec.method,
                path = %spec.path,
                "caching skipped: unsafe caching is disabled"
            );
            return None;
        }

        let Some(backend) = self.cache_config.backend() else {
            warn!(path = %spec.path, "caching requested but no cache backend is configured");
            return None;
        };

        match (mode, backend.is_async()) {
            (DispatchMode::Blocking, true) => {
                warn!(
                    cache = %backend.kind(),
                    "blocking request cannot use an async cache; configure a sync cache to enable caching"
                );
                return None;
            }
            (DispatchMode::Suspending, false) => {
                warn!(
                    cache = %backend.kind(),
                    "async request is using a sync cache; cache I/O will block the runtime thread"
                );
            }
            _ => {}
        }

        Some(CacheSlot {
            key: spec.cache_key(),
            ttl: normalize_ttl(spec.cache_ttl.or(self.default_cache_ttl)),
            backend,
        })
    }

    async fn lookup(slot: &CacheSlot) -> Option<Value> {
        match slot.backend.get(&slot.key).await {
            Ok(Some(value)) => {
                debug!(cache_key = %slot.key, "cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(cache_key = %slot.key, "cache miss");
                None
            }
            Err(e) => {
                warn!(cache_key = %slot.key, error = %e, "cache lookup failed; treating as a miss");
                None
            }
        }
    }

    async fn store(slot: &CacheSlot, payload: &Value) {
        match slot.backend.set(&slot.key, payload, slot.ttl).await {
            Ok(()) => debug!(cache_key = %slot.key, ttl = ?slot.ttl, "response cached"),
            Err(e) => warn!(cache_key = %slot.key, error = %e, "failed to cache response"),
        }
    }

    /// Run one request through the pipeline.
    pub(crate) async fn execute<R, T>(
        &self,
        transport: &T,
        spec: &RequestSpec,
    ) -> Result<Decoded<R>, BingxError>
    where
        R: DeserializeOwned,
        T: Transport,
    {
        let request = self.prepare(spec)?;

        let slot = self.cache_slot(spec, T::MODE);
        if let Some(slot) = &slot {
            if let Some(cached) = Self::lookup(slot).await {
                return Ok(decode(cached));
            }
        }

        debug!(method = %spec.method, path = %spec.path, "sending request");
        let response = transport.send(request).await?;
        let payload = validate(response)?;

        match slot {
            Some(slot) => {
                let decoded = decode::<R>(payload.clone());
                if decoded.is_typed() {
                    Self::store(&slot, &payload).await;
                }
                Ok(decoded)
            }
            None => Ok(decode(payload)),
        }
    }

    /// Remove the cached entry for a request from the active backend.
    pub(crate) async fn invalidate(
        &self,
        spec: &RequestSpec,
        mode: DispatchMode,
    ) -> Result<(), BingxError> {
        let Some(backend) = self.cache_config.backend() else {
            return Ok(());
        };
        if mode == DispatchMode::Blocking && backend.is_async() {
            return Err(CacheError::Unsupported(format!(
                "a blocking client cannot invalidate entries of an {} cache",
                backend.kind()
            ))
            .into());
        }

        let key = spec.cache_key();
        backend.delete(&key).await?;
        debug!(cache_key = %key, "cache entry invalidated");
        Ok(())
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.credentials.is_some())
            .field("default_cache_ttl", &self.default_cache_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{FixedTimestamp, StaticCredentials, canonicalize, sign};
    use crate::cache::{CacheKind, RedisSettings};
    use crate::rest::transport::{RawResponse, TransportSettings};
    use crate::rest::{Method, Params};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every request with the same response and counts the calls.
    #[derive(Clone)]
    struct CountingTransport<const BLOCKING: bool> {
        calls: Arc<AtomicUsize>,
        last: Arc<parking_lot::Mutex<Option<PreparedRequest>>>,
        response: RawResponse,
    }

    impl<const BLOCKING: bool> CountingTransport<BLOCKING> {
        fn answering(body: Value) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                last: Arc::new(parking_lot::Mutex::new(None)),
                response: RawResponse {
                    status: 200,
                    body: body.to_string(),
                },
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> PreparedRequest {
            self.last.lock().clone().unwrap()
        }
    }

    impl<const BLOCKING: bool> Transport for CountingTransport<BLOCKING> {
        const MODE: DispatchMode = if BLOCKING {
            DispatchMode::Blocking
        } else {
            DispatchMode::Suspending
        };

        fn open(_: &TransportSettings) -> Result<Self, BingxError> {
            Ok(Self::answering(json!({"code": 0})))
        }

        async fn send(&self, request: PreparedRequest) -> Result<RawResponse, BingxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock() = Some(request);
            Ok(self.response.clone())
        }
    }

    type AsyncCounting = CountingTransport<false>;
    type BlockingCounting = CountingTransport<true>;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        code: i64,
        data: String,
    }

    fn executor(cache_config: CacheConfig) -> Executor {
        Executor {
            base_url: "https://open-api.bingx.com".to_string(),
            credentials: Some(Arc::new(StaticCredentials::new("my-key", "my-secret"))),
            clock: Arc::new(FixedTimestamp(1_700_000_000_000)),
            cache_config: Arc::new(cache_config),
            default_cache_ttl: Some(Duration::from_secs(300)),
        }
    }

    fn pong() -> Value {
        json!({"code": 0, "data": "pong"})
    }

    #[test]
    fn test_prepare_signed_request() {
        let exec = executor(CacheConfig::disabled());
        let spec = RequestSpec::get("/openApi/spot/v1/account/balance")
            .param("recvWindow", 5000)
            .param("asset", "USDT");
        let request = exec.prepare(&spec).unwrap();

        let canonical = canonicalize(&spec.params, 1_700_000_000_000);
        let signature = sign("my-secret", &canonical).unwrap();
        assert_eq!(
            request.url,
            format!(
                "https://open-api.bingx.com/openApi/spot/v1/account/balance?asset=USDT&recvWindow=5000&timestamp=1700000000000&signature={signature}"
            )
        );
        assert_eq!(request.headers, vec![("X-BX-APIKEY", "my-key".to_string())]);
    }

    #[test]
    fn test_prepare_public_request() {
        let exec = executor(CacheConfig::disabled());
        let request = exec
            .prepare(&RequestSpec::get("openApi/swap/v2/server/time").public())
            .unwrap();
        assert_eq!(
            request.url,
            "https://open-api.bingx.com/openApi/swap/v2/server/time?timestamp=1700000000000"
        );
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_prepare_signature_override() {
        let exec = executor(CacheConfig::disabled());
        let spec = RequestSpec::post("/x")
            .param("a", 1)
            .signature_override(|query| format!("custom({})", query.len()));
        let request = exec.prepare(&spec).unwrap();
        assert!(request.url.ends_with("?a=1&timestamp=1700000000000&signature=custom(27)"));
    }

    #[test]
    fn test_prepare_missing_credentials() {
        let mut exec = executor(CacheConfig::disabled());
        exec.credentials = None;
        assert!(matches!(
            exec.prepare(&RequestSpec::get("/x")),
            Err(BingxError::MissingCredentials)
        ));
        assert!(exec.prepare(&RequestSpec::get("/x").public()).is_ok());
    }

    #[test]
    fn test_prepare_invalid_base_url() {
        let mut exec = executor(CacheConfig::disabled());
        exec.base_url = "not a url".to_string();
        assert!(matches!(
            exec.prepare(&RequestSpec::get("/x").public()),
            Err(BingxError::Url(_))
        ));
    }

    #[tokio::test]
    async fn test_get_is_served_from_cache() {
        let exec = executor(CacheConfig::new());
        let transport = AsyncCounting::answering(pong());
        let spec = RequestSpec::get("/api/v1/ping").param("foo", "bar").cached();

        let first: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        let second: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(second.typed().unwrap().data, "pong");
    }

    #[tokio::test]
    async fn test_uncached_get_always_dispatches() {
        let exec = executor(CacheConfig::new());
        let transport = AsyncCounting::answering(pong());
        let spec = RequestSpec::get("/api/v1/ping");

        for _ in 0..2 {
            let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        }
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_post_needs_unsafe_caching() {
        let exec = executor(CacheConfig::new());
        let transport = AsyncCounting::answering(pong());
        let spec = RequestSpec::post("/openApi/user/auth/userDataStream").cached();

        for _ in 0..2 {
            let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        }
        assert_eq!(transport.calls(), 2);

        exec.cache_config.enable_unsafe_cache();
        for _ in 0..2 {
            let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        }
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_schema_drift_is_not_cached() {
        let exec = executor(CacheConfig::new());
        let transport = AsyncCounting::answering(json!({"code": 0, "data": 42}));
        let spec = RequestSpec::get("/api/v1/ping").cached();

        for _ in 0..2 {
            let decoded: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
            assert_eq!(
                decoded.raw_payload(),
                Some(&json!({"code": 0, "data": 42}))
            );
        }
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_api_error_is_not_cached() {
        let exec = executor(CacheConfig::new());
        let transport = AsyncCounting::answering(json!({"code": 100413, "msg": "Incorrect apiKey"}));
        let spec = RequestSpec::get("/api/v1/ping").cached();

        for _ in 0..2 {
            let err = exec.execute::<Pong, _>(&transport, &spec).await.unwrap_err();
            assert!(err.as_api().unwrap().is_invalid_key());
        }
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_disabled_cache_is_noop() {
        let exec = executor(CacheConfig::disabled());
        let transport = AsyncCounting::answering(pong());
        let spec = RequestSpec::get("/api/v1/ping").cached();

        for _ in 0..2 {
            let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        }
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_unique_attribute_separates_entries() {
        let exec = executor(CacheConfig::new());
        let transport = AsyncCounting::answering(pong());
        let a = RequestSpec::get("/p").cached().unique_cache_attribute("acct-a");
        let b = RequestSpec::get("/p").cached().unique_cache_attribute("acct-b");

        let _: Decoded<Pong> = exec.execute(&transport, &a).await.unwrap();
        let _: Decoded<Pong> = exec.execute(&transport, &b).await.unwrap();
        let _: Decoded<Pong> = exec.execute(&transport, &a).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let exec = executor(CacheConfig::new());
        let transport = AsyncCounting::answering(pong());
        let spec = RequestSpec::get("/p").cached();

        let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        exec.invalidate(&spec, DispatchMode::Suspending).await.unwrap();
        let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_async_mode_uses_async_cache() {
        let backend = CacheBackend::create(CacheKind::AsyncMemory, &RedisSettings::default()).unwrap();
        let exec = executor(CacheConfig::with_backend(backend));
        let transport = AsyncCounting::answering(pong());
        let spec = RequestSpec::get("/p").cached();

        for _ in 0..3 {
            let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        }
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_blocking_mode_skips_async_cache() {
        let backend = CacheBackend::create(CacheKind::AsyncMemory, &RedisSettings::default()).unwrap();
        let exec = executor(CacheConfig::with_backend(backend));
        let transport = BlockingCounting::answering(pong());
        let spec = RequestSpec::get("/p").cached();

        for _ in 0..2 {
            let decoded: Decoded<Pong> =
                futures::executor::block_on(exec.execute(&transport, &spec)).unwrap();
            assert!(decoded.is_typed());
        }
        assert_eq!(transport.calls(), 2);
        assert!(futures::executor::block_on(exec.invalidate(&spec, DispatchMode::Blocking)).is_err());
    }

    #[test]
    fn test_blocking_mode_uses_sync_cache() {
        let exec = executor(CacheConfig::new());
        let transport = BlockingCounting::answering(pong());
        let spec = RequestSpec::get("/p").cached();

        for _ in 0..2 {
            let _: Decoded<Pong> =
                futures::executor::block_on(exec.execute(&transport, &spec)).unwrap();
        }
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_broken_cache_degrades_to_miss() {
        let settings = RedisSettings::new("127.0.0.1", 1).timeout(Duration::from_millis(500));
        let backend = CacheBackend::create(CacheKind::AsyncRedis, &settings).unwrap();
        let exec = executor(CacheConfig::with_backend(backend));
        let transport = AsyncCounting::answering(pong());
        let spec = RequestSpec::get("/p").cached();

        for _ in 0..2 {
            let decoded: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
            assert!(decoded.is_typed());
        }
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_snapshot_survives_swap() {
        let exec = executor(CacheConfig::new());
        let transport = AsyncCounting::answering(pong());
        let spec = RequestSpec::get("/p").cached();

        let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        exec.cache_config
            .set_cache(CacheKind::SyncMemory, &RedisSettings::default())
            .unwrap();
        let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();

        // The fresh backend starts empty.
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_request_level_ttl_wins() {
        let exec = executor(CacheConfig::new());
        let transport = AsyncCounting::answering(pong());
        let spec = RequestSpec::get("/p")
            .cached()
            .cache_ttl(Duration::from_millis(20));

        let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_method_reaches_transport() {
        let exec = executor(CacheConfig::disabled());
        let transport = AsyncCounting::answering(pong());
        let spec = RequestSpec::delete("/openApi/user/auth/userDataStream")
            .params(Params::new().with("listenKey", "abc"));

        let _: Decoded<Pong> = exec.execute(&transport, &spec).await.unwrap();
        let sent = transport.last_request();
        assert_eq!(sent.method, Method::Delete);
        assert!(sent.url.contains("listenKey=abc&timestamp="));
    }
}
