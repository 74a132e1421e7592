//! Cache key derivation.
//!
//! Keys have the form `METHOD:path:k1=v1:k2=v2[:unique_attribute]` with the
//! method uppercase, the leading `/` of the path dropped, and parameters
//! sorted by key. Authentication material (`timestamp`, `signature`) never
//! takes part, so repeated signed requests map to the same key.
//!
//! Names, values, path segments and the unique attribute are form-urlencoded,
//! so a `:`, `=` or `%` inside them cannot forge a delimiter.

use url::form_urlencoded::byte_serialize;

use crate::auth::{SIGNATURE_PARAM, TIMESTAMP_PARAM};
use crate::rest::{Method, Params};

const SEGMENT_DELIMITER: char = ':';

/// Derive the cache key for a request.
///
/// ```rust
/// use bingx_api_client::cache::build_key;
/// use bingx_api_client::rest::{Method, Params};
///
/// let params = Params::new().with("foo", "bar");
/// assert_eq!(build_key(Method::Get, "/api/v1/ping", &params, None), "GET:api/v1/ping:foo=bar");
/// assert_eq!(
///     build_key(Method::Get, "/api/v1/ping", &params, Some("custom_key")),
///     "GET:api/v1/ping:foo=bar:custom_key"
/// );
/// ```
pub fn build_key(
    method: Method,
    path: &str,
    params: &Params,
    unique_attribute: Option<&str>,
) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(key, _)| *key != TIMESTAMP_PARAM && *key != SIGNATURE_PARAM)
        .collect();
    pairs.sort_unstable();

    let mut key = String::with_capacity(64);
    key.push_str(method.as_str());
    key.push(SEGMENT_DELIMITER);
    for (i, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if i > 0 {
            key.push('/');
        }
        key.extend(byte_serialize(segment.as_bytes()));
    }

    for (name, value) in pairs {
        key.push(SEGMENT_DELIMITER);
        key.extend(byte_serialize(name.as_bytes()));
        key.push('=');
        key.extend(byte_serialize(value.as_bytes()));
    }

    if let Some(attribute) = unique_attribute.filter(|a| !a.is_empty()) {
        key.push(SEGMENT_DELIMITER);
        key.extend(byte_serialize(attribute.as_bytes()));
    }

    tracing::debug!(cache_key = %key, "generated cache key");
    key
}
