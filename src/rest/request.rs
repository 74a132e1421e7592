//! Request description types shared by the blocking and async clients.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::cache::build_key;
use crate::error::BingxError;

/// HTTP method of a BingX request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Uppercase method name as used on the wire and in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether responses to this method are cacheable without unsafe caching.
    pub fn is_safe(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// An insertion-ordered string mapping of request parameters.
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Builder-style [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a parameter only when a value is present.
    pub fn with_opt<V: fmt::Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Get the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Join the entries as `k=v` pairs separated by `&`, in insertion order.
    ///
    /// Values are not percent-encoded; BingX signs and reads the raw string.
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Build parameters from any serializable struct or map.
    ///
    /// `null` fields are skipped, strings are taken verbatim, numbers and
    /// booleans use their JSON text, and arrays or objects are sent as
    /// compact JSON.
    ///
    /// ```rust
    /// use bingx_api_client::rest::Params;
    ///
    /// #[derive(serde::Serialize)]
    /// #[serde(rename_all = "camelCase")]
    /// struct Query {
    ///     symbol: String,
    ///     recv_window: Option<u64>,
    /// }
    ///
    /// let params = Params::from_serialize(&Query { symbol: "BTC-USDT".into(), recv_window: None }).unwrap();
    /// assert_eq!(params.to_query_string(), "symbol=BTC-USDT");
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, BingxError> {
        match serde_json::to_value(value)? {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => {
                let mut params = Self::new();
                for (key, value) in map {
                    match value {
                        Value::Null => {}
                        Value::String(s) => params.insert(key, s),
                        other => params.insert(key, other),
                    }
                }
                Ok(params)
            }
            other => Err(BingxError::InvalidRequest(format!(
                "request parameters must serialize to an object, got {other}"
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v.into());
        }
        params
    }
}

/// Replaces the HMAC signer for one request.
///
/// Receives the canonical query string (including `timestamp`) and returns
/// the value sent as `signature`.
pub type SignatureOverride = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Everything the executor needs to run one request.
///
/// Built per call and not retained by the client.
///
/// ```rust
/// use std::time::Duration;
/// use bingx_api_client::rest::RequestSpec;
///
/// let spec = RequestSpec::get("/openApi/spot/v1/common/symbols")
///     .param("symbol", "BTC-USDT")
///     .cached()
///     .cache_ttl(Duration::from_secs(60));
/// assert_eq!(spec.cache_key(), "GET:openApi/spot/v1/common/symbols:symbol=BTC-USDT");
/// ```
#[derive(Clone)]
pub struct RequestSpec {
    /// HTTP method
    pub method: Method,
    /// Endpoint path, e.g. `/openApi/spot/v1/common/symbols`
    pub path: String,
    /// Request parameters, excluding `timestamp` and `signature`
    pub params: Params,
    /// Whether to attach the API key and HMAC signature
    pub requires_signature: bool,
    /// Whether the cache may serve or store this request
    pub use_cache: bool,
    /// TTL for the stored entry; falls back to the client default
    pub cache_ttl: Option<Duration>,
    /// Extra segment appended to the cache key
    pub unique_cache_attribute: Option<String>,
    /// Custom signer for this request
    pub signature_override: Option<SignatureOverride>,
}

impl RequestSpec {
    /// Create a signed, uncached request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::new(),
            requires_signature: true,
            use_cache: false,
            cache_ttl: None,
            unique_cache_attribute: None,
            signature_override: None,
        }
    }

    /// Create a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Create a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Create a PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// Create a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Add a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Replace all parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Skip the API key header and signature.
    pub fn public(mut self) -> Self {
        self.requires_signature = false;
        self
    }

    /// Enable caching for this request.
    pub fn cached(self) -> Self {
        self.use_cache(true)
    }

    /// Set whether caching applies to this request.
    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Set the TTL for the cached entry.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Set a disambiguator appended to the cache key.
    pub fn unique_cache_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.unique_cache_attribute = Some(attribute.into());
        self
    }

    /// Sign this request with a custom function instead of HMAC-SHA256.
    pub fn signature_override(
        mut self,
        signer: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.signature_override = Some(Arc::new(signer));
        self
    }

    /// The cache key this request is stored under.
    pub fn cache_key(&self) -> String {
        build_key(
            self.method,
            &self.path,
            &self.params,
            self.unique_cache_attribute.as_deref(),
        )
    }
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpec")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("requires_signature", &self.requires_signature)
            .field("use_cache", &self.use_cache)
            .field("cache_ttl", &self.cache_ttl)
            .field("unique_cache_attribute", &self.unique_cache_attribute)
            .field("signature_override", &self.signature_override.is_some())
            .finish()
    }
}
