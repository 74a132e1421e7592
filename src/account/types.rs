//! Types for account and API key endpoints.

use serde::Deserialize;

use crate::types::serde_helpers::empty_string_as_none;

/// A freshly generated user data stream key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenKey {
    pub listen_key: String,
}

/// A permission granted to an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "i64")]
pub enum Permission {
    SpotTrading,
    Reading,
    PerpetualTrading,
    UniversalTransfer,
    Withdrawal,
    SubAccountTransfer,
    Other(i64),
}

impl From<i64> for Permission {
    fn from(code: i64) -> Self {
        match code {
            1 => Self::SpotTrading,
            2 => Self::Reading,
            3 => Self::PerpetualTrading,
            4 => Self::UniversalTransfer,
            5 => Self::Withdrawal,
            7 => Self::SubAccountTransfer,
            other => Self::Other(other),
        }
    }
}

/// Permissions of the API key the client signs with.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPermissions {
    pub api_key: String,
    pub permissions: Vec<Permission>,
    /// IP whitelist; empty when unrestricted.
    #[serde(default)]
    pub ip_addresses: Vec<String>,
    #[serde(default, deserialize_with = "empty_string_as_none::deserialize")]
    pub note: Option<String>,
}

impl ApiPermissions {
    /// Whether the key holds `permission`.
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Restrictions of the API key the client signs with.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRestrictions {
    pub ip_restrict: bool,
    /// Creation time in milliseconds.
    pub create_time: i64,
    pub permits_universal_transfer: bool,
    pub enable_reading: bool,
    /// Perpetual swap trading.
    pub enable_futures: bool,
    pub enable_spot_and_margin_trading: bool,
}
