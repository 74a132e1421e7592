//! Types for USDT-M perpetual swap endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::serde_helpers::{default_on_error, lenient_bool, one_or_many};

/// Server time response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    /// Server time in milliseconds.
    pub server_time: i64,
}

/// Trading state of a perpetual contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "i64")]
pub enum ContractStatus {
    Offline,
    Online,
    PreOnline,
    /// Only closing positions is allowed.
    ForbiddenToOpen,
    Other(i64),
}

impl From<i64> for ContractStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Offline,
            1 => Self::Online,
            5 => Self::PreOnline,
            25 => Self::ForbiddenToOpen,
            other => Self::Other(other),
        }
    }
}

/// A USDT-M perpetual contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapContract {
    pub contract_id: String,
    /// Trading pair, e.g. `BTC-USDT`.
    pub symbol: String,
    pub quantity_precision: u32,
    pub price_precision: u32,
    pub taker_fee_rate: Decimal,
    pub maker_fee_rate: Decimal,
    /// Minimum order size in coin.
    pub trade_min_quantity: Decimal,
    /// Minimum order size in USDT.
    #[serde(rename = "tradeMinUSDT")]
    pub trade_min_usdt: Decimal,
    /// Settlement and margin asset.
    pub currency: String,
    pub asset: String,
    pub status: ContractStatus,
    /// Whether the API may open positions.
    #[serde(deserialize_with = "lenient_bool::deserialize")]
    pub api_state_open: bool,
    /// Whether the API may close positions.
    #[serde(deserialize_with = "lenient_bool::deserialize")]
    pub api_state_close: bool,
    /// Whether guaranteed stop loss is supported.
    #[serde(default, deserialize_with = "lenient_bool::deserialize")]
    pub ensure_trigger: bool,
    #[serde(default, deserialize_with = "default_on_error::deserialize")]
    pub trigger_fee_rate: Option<Decimal>,
    /// Whether broker users are barred from trading it.
    #[serde(default, deserialize_with = "lenient_bool::deserialize")]
    pub broker_state: bool,
    #[serde(default, deserialize_with = "default_on_error::deserialize")]
    pub launch_time: Option<i64>,
    #[serde(default, deserialize_with = "default_on_error::deserialize")]
    pub maintain_time: Option<i64>,
    #[serde(default, deserialize_with = "default_on_error::deserialize")]
    pub off_time: Option<i64>,
}

/// Latest price of a perpetual contract.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
    /// Match time in milliseconds.
    pub time: i64,
}

/// Ticker prices for one symbol or for all of them.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerPrices(#[serde(deserialize_with = "one_or_many::deserialize")] pub Vec<TickerPrice>);
