//! HTTP transports for the blocking and async clients.
//!
//! A [`Transport`] performs one prepared exchange and returns the raw status
//! and body. The request pipeline is written once against this trait; each
//! transport declares through [`Transport::MODE`] whether its I/O blocks the
//! thread or suspends the task, which decides how cache backends are used.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use reqwest_tracing::TracingMiddleware;

use crate::error::BingxError;
use crate::rest::Method;

/// Default timeout applied to every HTTP exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How a transport waits for I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// The calling thread blocks until the exchange completes
    Blocking,
    /// The calling task yields while the exchange is in flight
    Suspending,
}

/// Settings used whenever a transport is opened.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Timeout for the whole exchange, connect included
    pub timeout: Duration,
    /// Value of the `User-Agent` header
    pub user_agent: String,
    /// Retries for transient failures (async transport only)
    pub max_retries: u32,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("bingx-api-client/{}", env!("CARGO_PKG_VERSION")),
            max_retries: 0,
        }
    }
}

impl TransportSettings {
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&self.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("bingx-api-client"));
        headers.insert(USER_AGENT, value);
        headers
    }
}

/// A fully built request: signed URL plus headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including the query string
    pub url: String,
    /// Extra headers, e.g. the API key
    pub headers: Vec<(&'static str, String)>,
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl RawResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs HTTP exchanges for a client.
pub trait Transport: Clone + Send + Sync + 'static {
    /// How this transport waits for I/O.
    const MODE: DispatchMode;

    /// Open a transport, allocating its connection pool.
    fn open(settings: &TransportSettings) -> Result<Self, BingxError>;

    /// Send a request and read the whole response body.
    fn send(
        &self,
        request: PreparedRequest,
    ) -> impl Future<Output = Result<RawResponse, BingxError>> + Send;
}

/// Non-blocking transport over `reqwest` with tracing and optional retries.
#[derive(Debug, Clone)]
pub struct AsyncTransport {
    http_client: ClientWithMiddleware,
}

impl Transport for AsyncTransport {
    const MODE: DispatchMode = DispatchMode::Suspending;

    fn open(settings: &TransportSettings) -> Result<Self, BingxError> {
        let reqwest_client = reqwest::Client::builder()
            .default_headers(settings.default_headers())
            .timeout(settings.timeout)
            .build()?;

        let mut builder = ClientBuilder::new(reqwest_client).with(TracingMiddleware::default());
        if settings.max_retries > 0 {
            let retry_policy =
                ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self {
            http_client: builder.build(),
        })
    }

    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, BingxError> {
        let mut builder = self
            .http_client
            .request(request.method.into(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// Thread-blocking transport over `reqwest::blocking`.
///
/// Must not be opened or used from inside an async runtime.
#[derive(Debug, Clone)]
pub struct BlockingTransport {
    http_client: reqwest::blocking::Client,
}

impl Transport for BlockingTransport {
    const MODE: DispatchMode = DispatchMode::Blocking;

    fn open(settings: &TransportSettings) -> Result<Self, BingxError> {
        let http_client = reqwest::blocking::Client::builder()
            .default_headers(settings.default_headers())
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { http_client })
    }

    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, BingxError> {
        let mut builder = self
            .http_client
            .request(request.method.into(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }
}
