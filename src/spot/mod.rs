//! Spot trading endpoints.

mod types;

pub use types::*;

use serde::Serialize;

use crate::error::BingxError;
use crate::rest::endpoints::spot;
use crate::rest::{Endpoint, Params, RequestSpec, facade};
use crate::types::ApiResponse;

/// Request for spot trading symbols.
///
/// Symbol rules rarely change, so responses are cached.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotSymbolsRequest {
    pub symbol: Option<String>,
    pub recv_window: Option<u64>,
}

impl SpotSymbolsRequest {
    /// Create a request for one symbol, or all of them.
    pub fn new(symbol: Option<&str>) -> Self {
        Self {
            symbol: symbol.map(str::to_owned),
            recv_window: None,
        }
    }
}

impl Endpoint for SpotSymbolsRequest {
    type Response = ApiResponse<SpotSymbols>;
    type Output = Vec<SpotSymbol>;

    fn spec(&self) -> Result<RequestSpec, BingxError> {
        Ok(RequestSpec::get(spot::SYMBOLS)
            .params(Params::from_serialize(self)?)
            .public()
            .cached())
    }

    fn output(response: Self::Response) -> Vec<SpotSymbol> {
        response.data.symbols
    }
}

/// Request for the most recent public trades of a symbol.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTradesRequest {
    pub symbol: String,
    /// Number of trades, 100 by default and at most 500.
    pub limit: Option<u32>,
    pub recv_window: Option<u64>,
}

impl RecentTradesRequest {
    /// Create a request for `symbol`.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            limit: None,
            recv_window: None,
        }
    }

    /// Set the number of trades to return.
    pub fn limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }
}

impl Endpoint for RecentTradesRequest {
    type Response = ApiResponse<Vec<SpotTrade>>;
    type Output = Vec<SpotTrade>;

    fn spec(&self) -> Result<RequestSpec, BingxError> {
        if self.symbol.is_empty() {
            return Err(BingxError::InvalidRequest("symbol must not be empty".into()));
        }
        Ok(RequestSpec::get(spot::TRADES)
            .params(Params::from_serialize(self)?)
            .public())
    }

    fn output(response: Self::Response) -> Vec<SpotTrade> {
        response.data
    }
}

/// Request for the spot account balances. Requires credentials.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotBalancesRequest {
    pub recv_window: Option<u64>,
}

impl Endpoint for SpotBalancesRequest {
    type Response = ApiResponse<SpotBalances>;
    type Output = Vec<SpotBalance>;

    fn spec(&self) -> Result<RequestSpec, BingxError> {
        Ok(RequestSpec::get(spot::BALANCE).params(Params::from_serialize(self)?))
    }

    fn output(response: Self::Response) -> Vec<SpotBalance> {
        response.data.balances
    }
}

facade! {
    /// Get trading rules for one spot symbol or all of them.
    ///
    /// Served from the cache when one is configured.
    fn get_spot_symbols(symbol: Option<&str>) -> Vec<SpotSymbol> = SpotSymbolsRequest::new(symbol);

    /// Get recent public trades for a symbol.
    fn get_spot_recent_trades(symbol: &str, limit: Option<u32>) -> Vec<SpotTrade> =
        RecentTradesRequest::new(symbol).limit(limit);

    /// Get the spot account balances.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use bingx_api_client::auth::StaticCredentials;
    /// use bingx_api_client::rest::BingxClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = BingxClient::builder()
    ///         .credentials(Arc::new(StaticCredentials::new("key", "secret")))
    ///         .build();
    ///     client.connect()?;
    ///     for balance in client.get_spot_balances(None).await? {
    ///         println!("{}: {}", balance.asset, balance.total());
    ///     }
    ///     Ok(())
    /// }
    /// ```
    fn get_spot_balances(recv_window: Option<u64>) -> Vec<SpotBalance> =
        SpotBalancesRequest { recv_window };
}
