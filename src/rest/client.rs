//! BingX REST API client implementation.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::{CredentialsProvider, SystemClock, TimestampProvider};
use crate::cache::CacheConfig;
use crate::error::BingxError;
use crate::rest::blocking::BlockingBingxClient;
use crate::rest::decode::Decoded;
use crate::rest::endpoint::Endpoint;
use crate::rest::endpoints::{BINGX_BASE_URL, BINGX_DEMO_BASE_URL};
use crate::rest::executor::Executor;
use crate::rest::session::{Lifecycle, Session};
use crate::rest::transport::{AsyncTransport, BlockingTransport, Transport, TransportSettings};
use crate::rest::{Method, Params, RequestSpec};

/// Default lifetime of cached responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// State shared by the blocking and async clients.
///
/// The transport is only present between `connect` and `close`. Each call
/// clones it out of the slot, so closing does not interrupt calls already in
/// flight.
pub(crate) struct ClientCore<T> {
    pub(crate) executor: Executor,
    settings: TransportSettings,
    transport: RwLock<Option<T>>,
}

impl<T: Transport> ClientCore<T> {
    fn new(executor: Executor, settings: TransportSettings) -> Self {
        Self {
            executor,
            settings,
            transport: RwLock::new(None),
        }
    }

    pub(crate) fn connect(&self) -> Result<(), BingxError> {
        let mut slot = self.transport.write();
        if slot.is_none() {
            *slot = Some(T::open(&self.settings)?);
            debug!(base_url = %self.executor.base_url, mode = ?T::MODE, "session opened");
        }
        Ok(())
    }

    pub(crate) fn close(&self) {
        if self.transport.write().take().is_some() {
            debug!(base_url = %self.executor.base_url, mode = ?T::MODE, "session closed");
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.transport.read().is_some()
    }

    pub(crate) async fn request_decoded<R>(&self, spec: &RequestSpec) -> Result<Decoded<R>, BingxError>
    where
        R: DeserializeOwned,
    {
        let transport = self.transport.read().clone().ok_or(BingxError::NotConnected)?;
        self.executor.execute(&transport, spec).await
    }

    pub(crate) async fn invalidate(&self, spec: &RequestSpec) -> Result<(), BingxError> {
        self.executor.invalidate(spec, T::MODE).await
    }
}

impl<T> std::fmt::Debug for ClientCore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCore")
            .field("executor", &self.executor)
            .field("settings", &self.settings)
            .field("connected", &self.transport.read().is_some())
            .finish()
    }
}

/// The async BingX REST API client.
///
/// A client starts disconnected. Call [`BingxClient::connect`] (or open a
/// [`BingxClient::session`]) before sending requests; requests on a
/// disconnected client fail with [`BingxError::NotConnected`] without any
/// network I/O.
///
/// # Example
///
/// ```rust,no_run
/// use bingx_api_client::rest::BingxClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Create a client for public endpoints only
///     let client = BingxClient::new();
///     let session = client.session()?;
///
///     let time = session.get_server_time().await?;
///     println!("Server time: {}", time.server_time);
///
///     Ok(())
/// }
/// ```
///
/// For signed endpoints, provide credentials:
///
/// ```rust,no_run
/// use bingx_api_client::rest::BingxClient;
/// use bingx_api_client::auth::StaticCredentials;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let credentials = Arc::new(StaticCredentials::new("api_key", "api_secret"));
///     let client = BingxClient::builder()
///         .credentials(credentials)
///         .build();
///     client.connect()?;
///
///     let balances = client.get_spot_balances(None).await?;
///     println!("Balances: {:?}", balances);
///
///     client.close();
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BingxClient {
    core: Arc<ClientCore<AsyncTransport>>,
}

impl BingxClient {
    /// Create a new client with default settings.
    ///
    /// This client can only access public endpoints.
    /// Use [`BingxClient::builder()`] to configure credentials for signed endpoints.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    pub fn builder() -> BingxClientBuilder {
        BingxClientBuilder::new()
    }

    /// Open the HTTP connection pool. Calling it again is a no-op.
    pub fn connect(&self) -> Result<(), BingxError> {
        self.core.connect()
    }

    /// Release the HTTP connection pool. Calls already in flight complete.
    pub fn close(&self) {
        self.core.close()
    }

    /// Whether the client can send requests.
    pub fn is_connected(&self) -> bool {
        self.core.is_connected()
    }

    /// Connect and return a guard that closes the client when dropped.
    pub fn session(&self) -> Result<Session<'_, Self>, BingxError> {
        Session::open(self)
    }

    /// The cache configuration this client reads on every request.
    pub fn cache_config(&self) -> &Arc<CacheConfig> {
        &self.core.executor.cache_config
    }

    /// Execute a request and decode the response into `R`.
    ///
    /// A successful response that does not match `R` yields
    /// [`BingxError::Conversion`] carrying the untouched payload.
    pub async fn request<R>(&self, spec: RequestSpec) -> Result<R, BingxError>
    where
        R: DeserializeOwned,
    {
        self.request_decoded(spec).await?.into_result()
    }

    /// Execute a request, keeping the raw payload if it does not match `R`.
    pub async fn request_decoded<R>(&self, spec: RequestSpec) -> Result<Decoded<R>, BingxError>
    where
        R: DeserializeOwned,
    {
        self.core.request_decoded(&spec).await
    }

    /// Send a signed, uncached request.
    pub async fn send<R>(&self, method: Method, path: &str, params: Params) -> Result<R, BingxError>
    where
        R: DeserializeOwned,
    {
        self.request(RequestSpec::new(method, path).params(params)).await
    }

    /// Send a signed GET request.
    pub async fn get<R: DeserializeOwned>(&self, path: &str, params: Params) -> Result<R, BingxError> {
        self.send(Method::Get, path, params).await
    }

    /// Send a signed POST request.
    pub async fn post<R: DeserializeOwned>(&self, path: &str, params: Params) -> Result<R, BingxError> {
        self.send(Method::Post, path, params).await
    }

    /// Send a signed PUT request.
    pub async fn put<R: DeserializeOwned>(&self, path: &str, params: Params) -> Result<R, BingxError> {
        self.send(Method::Put, path, params).await
    }

    /// Send a signed DELETE request.
    pub async fn delete<R: DeserializeOwned>(&self, path: &str, params: Params) -> Result<R, BingxError> {
        self.send(Method::Delete, path, params).await
    }

    /// Call a typed endpoint.
    pub async fn call<E: Endpoint>(&self, endpoint: &E) -> Result<E::Output, BingxError> {
        let response: E::Response = self.request(endpoint.spec()?).await?;
        Ok(E::output(response))
    }

    /// Drop the cached response for a request, if any.
    pub async fn invalidate(&self, spec: &RequestSpec) -> Result<(), BingxError> {
        self.core.invalidate(spec).await
    }
}

impl Lifecycle for BingxClient {
    fn connect(&self) -> Result<(), BingxError> {
        BingxClient::connect(self)
    }

    fn close(&self) {
        BingxClient::close(self)
    }
}

impl Default for BingxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BingxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BingxClient")
            .field("base_url", &self.core.executor.base_url)
            .field("has_credentials", &self.core.executor.credentials.is_some())
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Builder for [`BingxClient`] and [`BlockingBingxClient`].
pub struct BingxClientBuilder {
    base_url: String,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    clock: Option<Arc<dyn TimestampProvider>>,
    cache_config: Option<Arc<CacheConfig>>,
    default_cache_ttl: Option<Duration>,
    settings: TransportSettings,
}

impl BingxClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: BINGX_BASE_URL.to_string(),
            credentials: None,
            clock: None,
            cache_config: None,
            default_cache_ttl: Some(DEFAULT_CACHE_TTL),
            settings: TransportSettings::default(),
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Switch between the live and the demo trading environment.
    pub fn demo_trading(mut self, demo: bool) -> Self {
        self.base_url = if demo {
            BINGX_DEMO_BASE_URL
        } else {
            BINGX_BASE_URL
        }
        .to_string();
        self
    }

    /// Set the credentials provider for signed requests.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom timestamp provider.
    pub fn clock(mut self, clock: Arc<dyn TimestampProvider>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use this cache configuration instead of the process-wide one.
    pub fn cache_config(mut self, config: Arc<CacheConfig>) -> Self {
        self.cache_config = Some(config);
        self
    }

    /// Set the TTL for cached responses that don't set their own.
    ///
    /// `None` or a zero duration stores entries that never expire.
    pub fn default_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_cache_ttl = ttl;
        self
    }

    /// Set the timeout for each HTTP exchange.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.settings.user_agent = user_agent.into();
        self
    }

    /// Set the maximum number of retries for transient failures.
    ///
    /// Only the async client retries. Defaults to 0.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.settings.max_retries = retries;
        self
    }

    fn into_core<T: Transport>(self) -> ClientCore<T> {
        let executor = Executor {
            base_url: self.base_url,
            credentials: self.credentials,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
            cache_config: self.cache_config.unwrap_or_else(CacheConfig::global),
            default_cache_ttl: self.default_cache_ttl,
        };
        ClientCore::new(executor, self.settings)
    }

    /// Build the async client.
    pub fn build(self) -> BingxClient {
        BingxClient {
            core: Arc::new(self.into_core::<AsyncTransport>()),
        }
    }

    /// Build the blocking client.
    pub fn build_blocking(self) -> BlockingBingxClient {
        BlockingBingxClient::from_core(Arc::new(self.into_core::<BlockingTransport>()))
    }
}

impl Default for BingxClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;

    #[test]
    fn test_builder_defaults() {
        let client = BingxClient::new();
        assert_eq!(client.core.executor.base_url, BINGX_BASE_URL);
        assert_eq!(client.core.executor.default_cache_ttl, Some(DEFAULT_CACHE_TTL));
        assert!(client.core.executor.credentials.is_none());
        assert!(Arc::ptr_eq(client.cache_config(), &CacheConfig::global()));
        assert!(!client.is_connected());
    }

    #[test]
    fn test_demo_trading_url() {
        let client = BingxClient::builder().demo_trading(true).build();
        assert_eq!(client.core.executor.base_url, BINGX_DEMO_BASE_URL);
    }

    #[test]
    fn test_debug_hides_secret() {
        let client = BingxClient::builder()
            .credentials(Arc::new(StaticCredentials::new("key", "very-secret")))
            .build();
        let debug = format!("{client:?}");
        assert!(debug.contains("has_credentials: true"));
        assert!(!debug.contains("very-secret"));
    }

    #[tokio::test]
    async fn test_not_connected_fails_fast() {
        let client = BingxClient::builder().base_url("http://127.0.0.1:1").build();
        let err = client
            .request::<serde_json::Value>(RequestSpec::get("/x").public())
            .await
            .unwrap_err();
        assert!(matches!(err, BingxError::NotConnected));
    }

    #[tokio::test]
    async fn test_connect_close_cycle() {
        let client = BingxClient::new();
        client.connect().unwrap();
        client.connect().unwrap();
        assert!(client.is_connected());

        let clone = client.clone();
        client.close();
        assert!(!clone.is_connected());

        {
            let _session = client.session().unwrap();
            assert!(client.is_connected());
        }
        assert!(!client.is_connected());
    }
}
