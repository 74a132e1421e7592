//! Error types for the BingX client library.

use std::error::Error as StdError;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::cache::CacheError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The main error type for all BingX client operations.
#[derive(Error, Debug)]
pub enum BingxError {
    /// The request never produced an HTTP response
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-success HTTP status and no BingX error body
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body as received
        body: String,
    },

    /// BingX reported a failure in the response body
    #[error("BingX API error: {0}")]
    Api(ApiError),

    /// The response succeeded but did not match the expected model
    #[error(transparent)]
    Conversion(ConversionError),

    /// A request was attempted on a client without an open connection
    #[error("Client is not connected: call connect() or open a session first")]
    NotConnected,

    /// Direct cache operation failed
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Missing required credentials
    #[error("Missing credentials: API key and secret required for signed requests")]
    MissingCredentials,

    /// The request could not be built from the given parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid response from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for BingxError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.into())
    }
}

impl From<reqwest_middleware::Error> for BingxError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::Transport(err.into())
    }
}

impl BingxError {
    /// The API error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Check if this error is a transport timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.kind == TransportErrorKind::Timeout)
    }
}

/// Cause of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The configured timeout elapsed
    Timeout,
    /// The connection could not be established
    Connect,
    /// TLS negotiation or certificate validation failed
    Tls,
    /// Any other I/O or protocol failure
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connection",
            Self::Tls => "TLS",
            Self::Other => "transport",
        };
        f.write_str(s)
    }
}

/// A network-level failure, classified by cause.
#[derive(Error, Debug)]
#[error("HTTP {kind} error: {source}")]
pub struct TransportError {
    /// What went wrong
    pub kind: TransportErrorKind,
    #[source]
    source: BoxError,
}

impl TransportError {
    /// Create a transport error of the given kind.
    pub fn new(kind: TransportErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if mentions_tls(&err) {
            TransportErrorKind::Tls
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err)
    }
}

impl From<reqwest_middleware::Error> for TransportError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(inner) => inner.into(),
            reqwest_middleware::Error::Middleware(inner) => {
                Self::new(TransportErrorKind::Other, BoxError::from(inner))
            }
        }
    }
}

// reqwest has no TLS predicate, so walk the source chain.
fn mentions_tls(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_ascii_lowercase();
        if message.contains("tls") || message.contains("certificate") || message.contains("handshake") {
            return true;
        }
        current = e.source();
    }
    false
}

/// Known BingX error codes for pattern matching.
pub mod error_codes {
    /// HTTP-style errors
    pub const BAD_REQUEST: i64 = 400;
    pub const UNAUTHORIZED: i64 = 401;
    pub const FORBIDDEN: i64 = 403;
    pub const NOT_FOUND: i64 = 404;
    pub const IP_BANNED: i64 = 418;
    pub const TOO_MANY_REQUESTS: i64 = 429;
    pub const INTERNAL_SERVER: i64 = 500;
    pub const GATEWAY_TIMEOUT: i64 = 504;

    /// Authentication errors
    pub const SIGNATURE_VERIFICATION_FAILED: i64 = 100001;
    pub const PERMISSION_DENIED: i64 = 100004;
    pub const RATE_LIMIT: i64 = 100410;
    pub const NULL_SIGNATURE: i64 = 100412;
    pub const INCORRECT_API_KEY: i64 = 100413;
    pub const IP_WHITELIST: i64 = 100419;
    pub const TIMESTAMP: i64 = 100421;
    pub const INTERNAL_SYSTEM: i64 = 100500;

    /// Order and position errors
    pub const TRADE_EXECUTION: i64 = 80001;
    pub const OPERATION: i64 = 80012;
    pub const ORDER_LIMIT_REACHED: i64 = 80013;
    pub const INVALID_PARAMETER: i64 = 80014;
    pub const ORDER_NOT_FOUND: i64 = 80016;
    pub const POSITION_NOT_FOUND: i64 = 80017;
    pub const ORDER_ALREADY_FILLED: i64 = 80018;
    pub const ORDER_PROCESSING: i64 = 80019;
    pub const RISK_FORBIDDEN: i64 = 80020;
    pub const INSUFFICIENT_MARGIN: i64 = 101204;
    pub const MAX_POSITION_VALUE: i64 = 101209;
    pub const ORDER_PRICE: i64 = 101211;
    pub const PENDING_ORDERS: i64 = 101212;
    pub const MAKER_ORDER: i64 = 101215;
    pub const TRADE_VALIDATION: i64 = 101400;
    pub const MAX_LEVERAGE: i64 = 101414;
    pub const TRADING_PAIR_SUSPENDED: i64 = 101415;
    pub const LIQUIDATION_PRICE: i64 = 101460;
    pub const RPC_TIMEOUT: i64 = 101500;
    pub const SUSPENDED_FROM_OPENING_POSITIONS: i64 = 101514;
    pub const DUPLICATE_ORDER: i64 = 109201;
}

/// Named error kinds for the codes BingX documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    IpBanned,
    TooManyRequests,
    InternalServer,
    GatewayTimeout,
    SignatureVerificationFailed,
    PermissionDenied,
    RateLimit,
    NullSignature,
    IncorrectApiKey,
    IpWhitelist,
    Timestamp,
    InternalSystem,
    TradeExecution,
    Operation,
    OrderLimitReached,
    InvalidParameter,
    OrderNotFound,
    PositionNotFound,
    OrderAlreadyFilled,
    OrderProcessing,
    RiskForbidden,
    InsufficientMargin,
    MaxPositionValue,
    OrderPrice,
    PendingOrders,
    MakerOrder,
    TradeValidation,
    MaxLeverage,
    TradingPairSuspended,
    LiquidationPrice,
    RpcTimeout,
    SuspendedFromOpeningPositions,
    DuplicateOrder,
    /// A code missing from the table; the raw code is kept on [`ApiError`].
    Unknown,
}

impl ApiErrorKind {
    /// Look up the kind for a BingX error code.
    pub fn from_code(code: i64) -> Self {
        use error_codes::*;

        match code {
            BAD_REQUEST => Self::BadRequest,
            UNAUTHORIZED => Self::Unauthorized,
            FORBIDDEN => Self::Forbidden,
            NOT_FOUND => Self::NotFound,
            IP_BANNED => Self::IpBanned,
            TOO_MANY_REQUESTS => Self::TooManyRequests,
            INTERNAL_SERVER => Self::InternalServer,
            GATEWAY_TIMEOUT => Self::GatewayTimeout,
            SIGNATURE_VERIFICATION_FAILED => Self::SignatureVerificationFailed,
            PERMISSION_DENIED => Self::PermissionDenied,
            RATE_LIMIT => Self::RateLimit,
            NULL_SIGNATURE => Self::NullSignature,
            INCORRECT_API_KEY => Self::IncorrectApiKey,
            IP_WHITELIST => Self::IpWhitelist,
            TIMESTAMP => Self::Timestamp,
            INTERNAL_SYSTEM => Self::InternalSystem,
            TRADE_EXECUTION => Self::TradeExecution,
            OPERATION => Self::Operation,
            ORDER_LIMIT_REACHED => Self::OrderLimitReached,
            INVALID_PARAMETER => Self::InvalidParameter,
            ORDER_NOT_FOUND => Self::OrderNotFound,
            POSITION_NOT_FOUND => Self::PositionNotFound,
            ORDER_ALREADY_FILLED => Self::OrderAlreadyFilled,
            ORDER_PROCESSING => Self::OrderProcessing,
            RISK_FORBIDDEN => Self::RiskForbidden,
            INSUFFICIENT_MARGIN => Self::InsufficientMargin,
            MAX_POSITION_VALUE => Self::MaxPositionValue,
            ORDER_PRICE => Self::OrderPrice,
            PENDING_ORDERS => Self::PendingOrders,
            MAKER_ORDER => Self::MakerOrder,
            TRADE_VALIDATION => Self::TradeValidation,
            MAX_LEVERAGE => Self::MaxLeverage,
            TRADING_PAIR_SUSPENDED => Self::TradingPairSuspended,
            LIQUIDATION_PRICE => Self::LiquidationPrice,
            RPC_TIMEOUT => Self::RpcTimeout,
            SUSPENDED_FROM_OPENING_POSITIONS => Self::SuspendedFromOpeningPositions,
            DUPLICATE_ORDER => Self::DuplicateOrder,
            _ => Self::Unknown,
        }
    }
}

/// An error reported by BingX in the response body.
///
/// BingX answers most failures with HTTP 200 and a non-zero `code` field:
///
/// ```json
/// {"code": 100001, "msg": "Signature verification failed", "timestamp": 1700000000000}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Numeric error code as reported by BingX
    pub code: i64,
    /// Human-readable error message
    pub message: String,
    /// Server timestamp attached to the error, if any
    pub timestamp: Option<i64>,
    /// Named kind resolved from the code table
    pub kind: ApiErrorKind,
    /// The response body exactly as received
    pub raw: Value,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}): {}", self.code, self.kind, self.message)?;
        if let Some(ts) = self.timestamp {
            write!(f, " (timestamp: {ts})")?;
        }
        Ok(())
    }
}

impl ApiError {
    /// Create a new API error from code and message.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            timestamp: None,
            kind: ApiErrorKind::from_code(code),
            raw: Value::Null,
        }
    }

    /// Extract an API error from a BingX response body.
    ///
    /// Returns `None` when the body carries no `code` or the code is `0`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let code = match payload.get("code")? {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        if code == 0 {
            return None;
        }

        let message = payload
            .get("msg")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or("No error message provided");

        Some(Self {
            code,
            message: message.to_string(),
            timestamp: payload.get("timestamp").and_then(Value::as_i64),
            kind: ApiErrorKind::from_code(code),
            raw: payload.clone(),
        })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::RateLimit | ApiErrorKind::TooManyRequests
        )
    }

    /// Check if this is a signing problem (bad, missing or stale signature).
    pub fn is_signature_error(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::SignatureVerificationFailed
                | ApiErrorKind::NullSignature
                | ApiErrorKind::Timestamp
        )
    }

    /// Check if the API key was rejected.
    pub fn is_invalid_key(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::IncorrectApiKey | ApiErrorKind::Unauthorized | ApiErrorKind::IpWhitelist
        )
    }

    /// Check if this is a permission denied error.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::PermissionDenied | ApiErrorKind::Forbidden
        )
    }

    /// Check if this is a server-side availability error.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::InternalServer
                | ApiErrorKind::GatewayTimeout
                | ApiErrorKind::InternalSystem
                | ApiErrorKind::RpcTimeout
        )
    }
}

/// A successful response that could not be converted into the requested model.
///
/// `initial_data` holds the payload untouched so callers can recover after an
/// upstream schema change.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError {
    /// The response body exactly as received
    pub initial_data: Value,
    /// Type name of the model the payload was converted into
    pub model: &'static str,
    /// Deserializer message
    pub reason: String,
}

const PREVIEW_LEN: usize = 300;

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.initial_data.to_string();
        let preview: String = data.chars().take(PREVIEW_LEN).collect();
        let ellipsis = if preview.len() < data.len() { "..." } else { "" };
        write!(
            f,
            "Failed to convert {preview}{ellipsis} to {}: {}",
            self.model, self.reason
        )
    }
}

impl StdError for ConversionError {}
