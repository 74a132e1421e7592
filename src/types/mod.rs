//! Types shared by every BingX endpoint.

pub mod serde_helpers;

use serde::{Deserialize, Serialize};

/// The envelope BingX wraps around most successful responses.
///
/// ```rust
/// use bingx_api_client::types::ApiResponse;
///
/// let json = r#"{"code":0,"msg":"","data":{"serverTime":1700000000000}}"#;
/// let response: ApiResponse<serde_json::Value> = serde_json::from_str(json).unwrap();
/// assert_eq!(response.code, 0);
/// assert_eq!(response.data["serverTime"], 1700000000000i64);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    /// Always zero on success.
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    /// Server time in milliseconds, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload.
    pub fn into_data(self) -> T {
        self.data
    }
}
