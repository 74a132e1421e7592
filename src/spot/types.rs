//! Types for spot endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Trading rules for a spot symbol.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotSymbol {
    /// Trading pair, e.g. `BTC-USDT`.
    pub symbol: String,
    pub min_qty: Decimal,
    pub max_qty: Decimal,
    pub min_notional: Decimal,
    pub max_notional: Decimal,
    /// 1 online, 0 offline, 5 pre-open, 25 trading suspended.
    pub status: i64,
    pub tick_size: Decimal,
    pub step_size: Decimal,
}

/// Spot symbols payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotSymbols {
    pub symbols: Vec<SpotSymbol>,
}

/// A public trade.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotTrade {
    pub id: i64,
    pub price: Decimal,
    pub qty: Decimal,
    /// Trade time in milliseconds.
    pub time: i64,
    /// Whether the buyer was the maker.
    pub buyer_maker: bool,
}

/// Balance of one spot asset.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotBalance {
    pub asset: String,
    /// Available amount.
    pub free: Decimal,
    /// Amount held by open orders.
    pub locked: Decimal,
}

impl SpotBalance {
    /// Free plus locked.
    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

/// Spot balances payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotBalances {
    pub balances: Vec<SpotBalance>,
}
