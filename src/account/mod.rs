//! Account and API key endpoints.
//!
//! Every request here is signed, so the client needs credentials.

mod types;

pub use types::*;

use serde::Serialize;
use serde::de::IgnoredAny;

use crate::error::BingxError;
use crate::rest::endpoints::account;
use crate::rest::{Endpoint, Params, RequestSpec, facade};

/// Generate a listen key for the user data stream.
///
/// A key stays valid for 60 minutes unless extended.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateListenKeyRequest;

impl Endpoint for GenerateListenKeyRequest {
    type Response = ListenKey;
    type Output = ListenKey;

    fn spec(&self) -> Result<RequestSpec, BingxError> {
        Ok(RequestSpec::post(account::USER_DATA_STREAM))
    }

    fn output(response: ListenKey) -> ListenKey {
        response
    }
}

/// Extend or delete an existing listen key.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenKeyRequest {
    #[serde(skip)]
    delete: bool,
    pub listen_key: String,
}

impl ListenKeyRequest {
    /// Extend `listen_key` by another 60 minutes.
    pub fn extend(listen_key: impl Into<String>) -> Self {
        Self {
            delete: false,
            listen_key: listen_key.into(),
        }
    }

    /// Close the stream bound to `listen_key`.
    pub fn delete(listen_key: impl Into<String>) -> Self {
        Self {
            delete: true,
            listen_key: listen_key.into(),
        }
    }
}

impl Endpoint for ListenKeyRequest {
    type Response = IgnoredAny;
    type Output = ();

    fn spec(&self) -> Result<RequestSpec, BingxError> {
        if self.listen_key.is_empty() {
            return Err(BingxError::InvalidRequest("listen key must not be empty".into()));
        }
        let spec = if self.delete {
            RequestSpec::delete(account::USER_DATA_STREAM)
        } else {
            RequestSpec::put(account::USER_DATA_STREAM)
        };
        Ok(spec.params(Params::from_serialize(self)?))
    }

    fn output(_: IgnoredAny) {}
}

/// Query API key permissions or restrictions.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRequest {
    pub recv_window: Option<u64>,
}

/// Permissions of the signing key.
#[derive(Debug, Clone, Default)]
pub struct ApiPermissionsRequest(pub ApiKeyRequest);

impl Endpoint for ApiPermissionsRequest {
    type Response = ApiPermissions;
    type Output = ApiPermissions;

    fn spec(&self) -> Result<RequestSpec, BingxError> {
        Ok(RequestSpec::get(account::API_PERMISSIONS).params(Params::from_serialize(&self.0)?))
    }

    fn output(response: ApiPermissions) -> ApiPermissions {
        response
    }
}

/// Restrictions of the signing key.
#[derive(Debug, Clone, Default)]
pub struct ApiRestrictionsRequest(pub ApiKeyRequest);

impl Endpoint for ApiRestrictionsRequest {
    type Response = ApiRestrictions;
    type Output = ApiRestrictions;

    fn spec(&self) -> Result<RequestSpec, BingxError> {
        Ok(RequestSpec::get(account::API_RESTRICTIONS).params(Params::from_serialize(&self.0)?))
    }

    fn output(response: ApiRestrictions) -> ApiRestrictions {
        response
    }
}

facade! {
    /// Generate a listen key for the user data stream.
    fn generate_listen_key() -> ListenKey = GenerateListenKeyRequest;

    /// Extend the validity of a listen key by 60 minutes.
    fn extend_listen_key(listen_key: &str) -> () = ListenKeyRequest::extend(listen_key);

    /// Delete a listen key, closing its stream.
    fn delete_listen_key(listen_key: &str) -> () = ListenKeyRequest::delete(listen_key);

    /// Get the permissions of the signing API key.
    fn get_api_permissions(recv_window: Option<u64>) -> ApiPermissions =
        ApiPermissionsRequest(ApiKeyRequest { recv_window });

    /// Get the restrictions of the signing API key.
    fn get_api_restrictions(recv_window: Option<u64>) -> ApiRestrictions =
        ApiRestrictionsRequest(ApiKeyRequest { recv_window });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::{Decoded, Method, decode};
    use serde_json::{Value, json};

    #[test]
    fn test_listen_key_lifecycle_specs() {
        let generate = GenerateListenKeyRequest.spec().unwrap();
        assert_eq!(generate.method, Method::Post);
        assert!(generate.requires_signature);
        assert!(generate.params.is_empty());

        let extend = ListenKeyRequest::extend("abc").spec().unwrap();
        assert_eq!(extend.method, Method::Put);
        assert_eq!(extend.params.to_query_string(), "listenKey=abc");

        let delete = ListenKeyRequest::delete("abc").spec().unwrap();
        assert_eq!(delete.method, Method::Delete);
        assert_eq!(delete.params.to_query_string(), "listenKey=abc");
    }

    #[test]
    fn test_empty_listen_key_rejected() {
        assert!(matches!(
            ListenKeyRequest::extend("").spec(),
            Err(BingxError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_listen_key_responses() {
        let decoded: Decoded<ListenKey> = decode(json!({"listenKey": "a8ea75681542e66f1a50a1616dd06ed77dab61baa0c296bca03a9b13ee5f2dd7"}));
        assert_eq!(decoded.into_result().unwrap().listen_key.len(), 64);

        let decoded: Decoded<IgnoredAny> = decode(Value::Null);
        ListenKeyRequest::output(decoded.into_result().unwrap());
    }

    #[test]
    fn test_permissions_deserialization() {
        let decoded: Decoded<ApiPermissions> = decode(json!({
            "apiKey": "key",
            "permissions": [1, 2, 3, 42],
            "ipAddresses": [],
            "note": ""
        }));
        let permissions = decoded.into_result().unwrap();
        assert!(permissions.has(Permission::SpotTrading));
        assert!(permissions.has(Permission::Other(42)));
        assert!(!permissions.has(Permission::Withdrawal));
        assert!(permissions.note.is_none());
    }

    #[test]
    fn test_restrictions_deserialization() {
        let decoded: Decoded<ApiRestrictions> = decode(json!({
            "ipRestrict": false,
            "createTime": 1700000000000i64,
            "permitsUniversalTransfer": true,
            "enableReading": true,
            "enableFutures": false,
            "enableSpotAndMarginTrading": true
        }));
        let restrictions = decoded.into_result().unwrap();
        assert!(restrictions.enable_reading);
        assert!(!restrictions.enable_futures);
    }
}
