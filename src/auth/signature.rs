//! HMAC-SHA256 signature generation for BingX API authentication.
//!
//! BingX signed endpoints expect:
//! ```text
//! query     = sorted non-empty params joined as k=v with '&', then "&timestamp=<ms>"
//! signature = hex(HMAC-SHA256(api_secret, query))
//! ```
//!
//! The signature is appended to the query string as `&signature=<hex>` and the
//! API key travels in the `X-BX-APIKEY` header.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::Credentials;
use crate::error::BingxError;
use crate::rest::Params;

type HmacSha256 = Hmac<Sha256>;

/// Parameter name carrying the request timestamp.
pub(crate) const TIMESTAMP_PARAM: &str = "timestamp";
/// Parameter name carrying the request signature.
pub(crate) const SIGNATURE_PARAM: &str = "signature";

/// Build the canonical parameter set that gets signed and sent.
///
/// Keys are sorted lexicographically, entries with empty values are dropped,
/// and `timestamp` is appended last. Caller-supplied `timestamp` or
/// `signature` entries are replaced.
pub fn canonicalize(params: &Params, timestamp: u64) -> Params {
    let mut entries: Vec<(&str, &str)> = params
        .iter()
        .filter(|(key, value)| {
            !value.is_empty() && *key != TIMESTAMP_PARAM && *key != SIGNATURE_PARAM
        })
        .collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut canonical: Params = entries.into_iter().collect();
    canonical.insert(TIMESTAMP_PARAM, timestamp);
    canonical
}

/// Sign an ordered parameter set with a secret.
///
/// The parameters are signed in the order given; pass the output of
/// [`canonicalize`]. Returns the lowercase hex HMAC-SHA256 digest.
///
/// # Example
///
/// ```rust
/// use bingx_api_client::auth::{canonicalize, sign};
/// use bingx_api_client::rest::Params;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let params = Params::new().with("symbol", "BTC-USDT");
/// let canonical = canonicalize(&params, 1700000000000);
/// let signature = sign("api_secret", &canonical)?;
/// assert_eq!(signature.len(), 64);
/// # Ok(())
/// # }
/// ```
pub fn sign(secret: &str, canonical_params: &Params) -> Result<String, BingxError> {
    hmac_hex(secret, &canonical_params.to_query_string())
}

fn hmac_hex(secret: &str, payload: &str) -> Result<String, BingxError> {
    let mut hmac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BingxError::Auth(format!("Invalid HMAC key: {e}")))?;
    hmac.update(payload.as_bytes());
    Ok(hex::encode(hmac.finalize().into_bytes()))
}

/// Sign a canonical parameter set with the secret held by `credentials`.
pub fn sign_request(
    credentials: &Credentials,
    canonical_params: &Params,
) -> Result<String, BingxError> {
    sign(credentials.expose_secret(), canonical_params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_sorts_and_appends_timestamp() {
        let params = Params::new()
            .with("symbol", "BTC-USDT")
            .with("limit", 100)
            .with("empty", "")
            .with("timestamp", 1);
        let canonical = canonicalize(&params, 1700000000000);
        assert_eq!(
            canonical.to_query_string(),
            "limit=100&symbol=BTC-USDT&timestamp=1700000000000"
        );
    }

    #[test]
    fn test_canonicalize_empty_params() {
        let canonical = canonicalize(&Params::new(), 42);
        assert_eq!(canonical.to_query_string(), "timestamp=42");
    }

    #[test]
    fn test_known_vector() {
        let signature = hmac_hex("key", "The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(
            signature,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_signature_consistency() {
        let canonical = canonicalize(&Params::new().with("asset", "USDT"), 12345);
        let sig1 = sign("my_secret", &canonical).unwrap();
        let sig2 = sign("my_secret", &canonical).unwrap();
        assert_eq!(sig1, sig2);
        assert_eq!(sig1.len(), 64);
    }

    #[test]
    fn test_signature_changes_with_params() {
        let a = canonicalize(&Params::new().with("symbol", "BTC-USDT"), 12345);
        let b = canonicalize(&Params::new().with("symbol", "ETH-USDT"), 12345);
        assert_ne!(sign("my_secret", &a).unwrap(), sign("my_secret", &b).unwrap());
    }

    #[test]
    fn test_signature_changes_with_timestamp() {
        let a = canonicalize(&Params::new(), 12345);
        let b = canonicalize(&Params::new(), 12346);
        assert_ne!(sign("my_secret", &a).unwrap(), sign("my_secret", &b).unwrap());
    }

    #[test]
    fn test_signature_independent_of_insertion_order() {
        let a = Params::new().with("a", 1).with("b", 2);
        let b = Params::new().with("b", 2).with("a", 1);
        assert_eq!(
            sign("s", &canonicalize(&a, 1)).unwrap(),
            sign("s", &canonicalize(&b, 1)).unwrap()
        );
    }
}
