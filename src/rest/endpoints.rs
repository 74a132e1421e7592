//! BingX REST API endpoint constants.

/// Base URL for the BingX REST API.
pub const BINGX_BASE_URL: &str = "https://open-api.bingx.com";

/// Base URL for BingX demo trading (virtual funds).
pub const BINGX_DEMO_BASE_URL: &str = "https://open-api-vst.bingx.com";

/// Header carrying the API key on signed requests.
pub const API_KEY_HEADER: &str = "X-BX-APIKEY";

/// Account and API key endpoints.
pub mod account {
    /// Generate, extend or delete a user data stream listen key.
    pub const USER_DATA_STREAM: &str = "/openApi/user/auth/userDataStream";
    /// Query API key permissions.
    pub const API_PERMISSIONS: &str = "/openApi/v1/account/apiPermissions";
    /// Query API key restrictions.
    pub const API_RESTRICTIONS: &str = "/openApi/v1/account/apiRestrictions";
}

/// Spot trading endpoints.
pub mod spot {
    /// Spot trading symbols.
    pub const SYMBOLS: &str = "/openApi/spot/v1/common/symbols";
    /// Recent trades list.
    pub const TRADES: &str = "/openApi/spot/v1/market/trades";
    /// Spot account asset balances.
    pub const BALANCE: &str = "/openApi/spot/v1/account/balance";
}

/// USDT-M perpetual swap endpoints.
pub mod swap {
    /// Server time.
    pub const SERVER_TIME: &str = "/openApi/swap/v2/server/time";
    /// Perpetual contract symbols.
    pub const CONTRACTS: &str = "/openApi/swap/v2/quote/contracts";
    /// Latest price per symbol.
    pub const TICKER_PRICE: &str = "/openApi/swap/v1/ticker/price";
}
