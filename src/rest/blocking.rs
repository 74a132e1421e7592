//! Blocking BingX REST API client.
//!
//! Runs the same pipeline as [`BingxClient`](crate::rest::BingxClient) and
//! blocks the calling thread on each step. It must not be used from inside
//! an async runtime; use the async client there.

use std::sync::Arc;

use futures::executor::block_on;
use serde::de::DeserializeOwned;

use crate::cache::CacheConfig;
use crate::error::BingxError;
use crate::rest::client::{BingxClientBuilder, ClientCore};
use crate::rest::decode::Decoded;
use crate::rest::endpoint::Endpoint;
use crate::rest::session::{Lifecycle, Session};
use crate::rest::transport::BlockingTransport;
use crate::rest::{Method, Params, RequestSpec};

/// The blocking BingX REST API client.
///
/// Only sync cache backends are used; with an async backend configured,
/// requests skip the cache and log a warning.
///
/// # Example
///
/// ```rust,no_run
/// use bingx_api_client::rest::{BlockingBingxClient, RequestSpec};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BlockingBingxClient::new();
/// client.connect()?;
///
/// let symbols: serde_json::Value = client.request(
///     RequestSpec::get("/openApi/spot/v1/common/symbols")
///         .public()
///         .cached(),
/// )?;
/// println!("{symbols}");
///
/// client.close();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BlockingBingxClient {
    core: Arc<ClientCore<BlockingTransport>>,
}

impl BlockingBingxClient {
    pub(crate) fn from_core(core: Arc<ClientCore<BlockingTransport>>) -> Self {
        Self { core }
    }

    /// Create a new client with default settings, for public endpoints only.
    pub fn new() -> Self {
        Self::builder().build_blocking()
    }

    /// Create a new client builder.
    pub fn builder() -> BingxClientBuilder {
        BingxClientBuilder::new()
    }

    /// Open the HTTP connection pool. Calling it again is a no-op.
    pub fn connect(&self) -> Result<(), BingxError> {
        self.core.connect()
    }

    /// Release the HTTP connection pool.
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
    pub fn request<R: DeserializeOwned>(&self, spec: RequestSpec) -> Result<R, BingxError> {
        self.request_decoded(spec)?.into_result()
    }

    /// Execute a request, keeping the raw payload if it does not match `R`.
    pub fn request_decoded<R: DeserializeOwned>(
        &self,
        spec: RequestSpec,
    ) -> Result<Decoded<R>, BingxError> {
        block_on(self.core.request_decoded(&spec))
    }

    /// Send a signed, uncached request.
    pub fn send<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: Params,
    ) -> Result<R, BingxError> {
        self.request(RequestSpec::new(method, path).params(params))
    }

    /// Send a signed GET request.
    pub fn get<R: DeserializeOwned>(&self, path: &str, params: Params) -> Result<R, BingxError> {
        self.send(Method::Get, path, params)
    }

    /// Send a signed POST request.
    pub fn post<R: DeserializeOwned>(&self, path: &str, params: Params) -> Result<R, BingxError> {
        self.send(Method::Post, path, params)
    }

    /// Send a signed PUT request.
    pub fn put<R: DeserializeOwned>(&self, path: &str, params: Params) -> Result<R, BingxError> {
        self.send(Method::Put, path, params)
    }

    /// Send a signed DELETE request.
    pub fn delete<R: DeserializeOwned>(&self, path: &str, params: Params) -> Result<R, BingxError> {
        self.send(Method::Delete, path, params)
    }

    /// Call a typed endpoint.
    pub fn call<E: Endpoint>(&self, endpoint: &E) -> Result<E::Output, BingxError> {
        let response: E::Response = self.request(endpoint.spec()?)?;
        Ok(E::output(response))
    }

    /// Drop the cached response for a request, if any.
    ///
    /// Fails with a cache error when the active backend is async.
    pub fn invalidate(&self, spec: &RequestSpec) -> Result<(), BingxError> {
        block_on(self.core.invalidate(spec))
    }
}

impl Lifecycle for BlockingBingxClient {
    fn connect(&self) -> Result<(), BingxError> {
        BlockingBingxClient::connect(self)
    }

    fn close(&self) {
        BlockingBingxClient::close(self)
    }
}

impl Default for BlockingBingxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BlockingBingxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingBingxClient")
            .field("base_url", &self.core.executor.base_url)
            .field("has_credentials", &self.core.executor.credentials.is_some())
            .field("connected", &self.is_connected())
            .finish()
    }
}
