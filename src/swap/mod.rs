//! USDT-M perpetual swap endpoints.

mod types;

pub use types::*;

use serde::Serialize;

use crate::error::BingxError;
use crate::rest::endpoints::swap;
use crate::rest::{Endpoint, Params, RequestSpec, facade};
use crate::types::ApiResponse;

/// Request for the server time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerTimeRequest;

impl Endpoint for ServerTimeRequest {
    type Response = ApiResponse<ServerTime>;
    type Output = ServerTime;

    fn spec(&self) -> Result<RequestSpec, BingxError> {
        Ok(RequestSpec::get(swap::SERVER_TIME).public())
    }

    fn output(response: Self::Response) -> ServerTime {
        response.data
    }
}

/// Request for perpetual contract symbols.
///
/// Contract specifications rarely change, so responses are cached.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapContractsRequest {
    pub symbol: Option<String>,
    pub recv_window: Option<u64>,
}

impl SwapContractsRequest {
    /// Create a request for one symbol, or all of them.
    pub fn new(symbol: Option<&str>) -> Self {
        Self {
            symbol: symbol.map(str::to_owned),
            recv_window: None,
        }
    }
}

impl Endpoint for SwapContractsRequest {
    type Response = ApiResponse<Vec<SwapContract>>;
    type Output = Vec<SwapContract>;

    fn spec(&self) -> Result<RequestSpec, BingxError> {
        Ok(RequestSpec::get(swap::CONTRACTS)
            .params(Params::from_serialize(self)?)
            .public()
            .cached())
    }

    fn output(response: Self::Response) -> Vec<SwapContract> {
        response.data
    }
}

/// Request for the latest price of one or all perpetual contracts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickerPriceRequest {
    pub symbol: Option<String>,
}

impl TickerPriceRequest {
    /// Create a request for one symbol, or all of them.
    pub fn new(symbol: Option<&str>) -> Self {
        Self {
            symbol: symbol.map(str::to_owned),
        }
    }
}

impl Endpoint for TickerPriceRequest {
    type Response = ApiResponse<TickerPrices>;
    type Output = Vec<TickerPrice>;

    fn spec(&self) -> Result<RequestSpec, BingxError> {
        Ok(RequestSpec::get(swap::TICKER_PRICE)
            .params(Params::from_serialize(self)?)
            .public())
    }

    fn output(response: Self::Response) -> Vec<TickerPrice> {
        response.data.0
    }
}

facade! {
    /// Get the server time.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use bingx_api_client::rest::BingxClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = BingxClient::new();
    ///     let _session = client.session()?;
    ///     let time = client.get_server_time().await?;
    ///     println!("Server time: {}", time.server_time);
    ///     Ok(())
    /// }
    /// ```
    fn get_server_time() -> ServerTime = ServerTimeRequest;

    /// Get perpetual contract specifications, for one symbol or all of them.
    ///
    /// Served from the cache when one is configured.
    fn get_swap_contracts(symbol: Option<&str>) -> Vec<SwapContract> =
        SwapContractsRequest::new(symbol);

    /// Get the latest price for one symbol or all of them.
    fn get_swap_ticker_price(symbol: Option<&str>) -> Vec<TickerPrice> =
        TickerPriceRequest::new(symbol);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::{Decoded, Method, decode};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_contracts_spec_is_public_and_cached() {
        let spec = SwapContractsRequest::new(Some("BTC-USDT")).spec().unwrap();
        assert_eq!(spec.method, Method::Get);
        assert_eq!(spec.path, swap::CONTRACTS);
        assert!(!spec.requires_signature);
        assert!(spec.use_cache);
        assert_eq!(spec.params.to_query_string(), "symbol=BTC-USDT");

        let all = SwapContractsRequest::new(None).spec().unwrap();
        assert!(all.params.is_empty());
    }

    #[test]
    fn test_contract_deserialization() {
        let payload = json!({
            "code": 0,
            "msg": "",
            "data": [{
                "contractId": "100",
                "symbol": "BTC-USDT",
                "quantityPrecision": 4,
                "pricePrecision": 1,
                "takerFeeRate": 0.0005,
                "makerFeeRate": 0.0002,
                "tradeMinQuantity": 0.0001,
                "tradeMinUSDT": 2,
                "currency": "USDT",
                "asset": "BTC",
                "status": 1,
                "apiStateOpen": "true",
                "apiStateClose": "true",
                "ensureTrigger": true,
                "triggerFeeRate": "0.00020000",
                "brokerState": false,
                "launchTime": 1586275200000i64,
                "maintainTime": 0,
                "offTime": 0
            }]
        });

        let decoded: Decoded<ApiResponse<Vec<SwapContract>>> = decode(payload);
        let contracts = SwapContractsRequest::output(decoded.into_result().unwrap());
        let btc = &contracts[0];
        assert_eq!(btc.symbol, "BTC-USDT");
        assert_eq!(btc.status, ContractStatus::Online);
        assert_eq!(btc.taker_fee_rate, dec!(0.0005));
        assert_eq!(btc.trade_min_usdt, dec!(2));
        assert_eq!(btc.trigger_fee_rate, Some(dec!(0.0002)));
        assert!(btc.api_state_open);
        assert!(!btc.broker_state);
    }

    #[test]
    fn test_unknown_contract_status_is_kept() {
        assert_eq!(ContractStatus::from(25), ContractStatus::ForbiddenToOpen);
        assert_eq!(ContractStatus::from(7), ContractStatus::Other(7));
    }

    #[test]
    fn test_ticker_price_one_or_many() {
        let one = json!({"code": 0, "data": {"symbol": "BTC-USDT", "price": "64000.5", "time": 1}});
        let decoded: Decoded<ApiResponse<TickerPrices>> = decode(one);
        let prices = TickerPriceRequest::output(decoded.into_result().unwrap());
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].price, dec!(64000.5));

        let many = json!({"code": 0, "data": [
            {"symbol": "BTC-USDT", "price": "64000.5", "time": 1},
            {"symbol": "ETH-USDT", "price": "3100", "time": 1}
        ]});
        let decoded: Decoded<ApiResponse<TickerPrices>> = decode(many);
        assert_eq!(TickerPriceRequest::output(decoded.into_result().unwrap()).len(), 2);
    }

    #[test]
    fn test_server_time_spec() {
        let spec = ServerTimeRequest.spec().unwrap();
        assert_eq!(spec.path, "/openApi/swap/v2/server/time");
        assert!(!spec.requires_signature);
        assert!(!spec.use_cache);
    }
}
