//! Response decoding.
//!
//! A response body goes through two stages. [`validate`] turns the raw
//! exchange into a JSON payload or a transport-level/API error. [`decode`]
//! then projects the payload onto the requested model, keeping the payload
//! untouched when the projection fails.

use std::any::type_name;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, BingxError, ConversionError};
use crate::rest::RawResponse;

/// A validated response, typed when it matches the model.
///
/// `Raw` is returned when BingX reported success but the payload no longer
/// fits the model, typically after an upstream schema change.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// The payload matched the model
    Typed(T),
    /// The payload did not match; it is kept exactly as received
    Raw {
        /// The untouched response payload
        payload: Value,
        /// Why the projection failed
        error: String,
    },
}

impl<T> Decoded<T> {
    /// Whether the payload matched the model.
    pub fn is_typed(&self) -> bool {
        matches!(self, Decoded::Typed(_))
    }

    /// The typed value, if any.
    pub fn typed(&self) -> Option<&T> {
        match self {
            Decoded::Typed(value) => Some(value),
            Decoded::Raw { .. } => None,
        }
    }

    /// The raw payload of a failed projection, if any.
    pub fn raw_payload(&self) -> Option<&Value> {
        match self {
            Decoded::Typed(_) => None,
            Decoded::Raw { payload, .. } => Some(payload),
        }
    }

    /// Convert into the typed value, or a [`ConversionError`] carrying the
    /// untouched payload.
    pub fn into_result(self) -> Result<T, BingxError> {
        match self {
            Decoded::Typed(value) => Ok(value),
            Decoded::Raw { payload, error } => Err(BingxError::Conversion(ConversionError {
                initial_data: payload,
                model: type_name::<T>(),
                reason: error,
            })),
        }
    }

    /// Map the typed value, leaving a raw payload as it is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Typed(value) => Decoded::Typed(f(value)),
            Decoded::Raw { payload, error } => Decoded::Raw { payload, error },
        }
    }
}

impl<T: Serialize> Decoded<T> {
    /// The payload as JSON, whichever variant this is.
    pub fn to_value(&self) -> Result<Value, BingxError> {
        match self {
            Decoded::Typed(value) => Ok(serde_json::to_value(value)?),
            Decoded::Raw { payload, .. } => Ok(payload.clone()),
        }
    }
}

/// Turn a raw exchange into a success payload.
///
/// - A body carrying a non-zero BingX `code` becomes [`BingxError::Api`],
///   whatever the HTTP status.
/// - A non-2xx status without a BingX error body becomes
///   [`BingxError::HttpStatus`].
/// - A 2xx body that is not JSON becomes [`BingxError::InvalidResponse`].
/// - An empty 2xx body is `null`.
pub fn validate(response: RawResponse) -> Result<Value, BingxError> {
    if response.is_success() && response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let payload = match serde_json::from_str::<Value>(&response.body) {
        Ok(payload) => payload,
        Err(_) if !response.is_success() => {
            return Err(BingxError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }
        Err(e) => {
            return Err(BingxError::InvalidResponse(format!(
                "Failed to parse response: {e}. Body: {}",
                response.body
            )));
        }
    };

    if let Some(api_error) = ApiError::from_payload(&payload) {
        return Err(BingxError::Api(api_error));
    }

    if !response.is_success() {
        return Err(BingxError::HttpStatus {
            status: response.status,
            body: response.body,
        });
    }

    Ok(payload)
}

/// Project a validated payload onto a model.
pub fn decode<T: DeserializeOwned>(payload: Value) -> Decoded<T> {
    match T::deserialize(&payload) {
        Ok(value) => Decoded::Typed(value),
        Err(e) => Decoded::Raw {
            payload,
            error: e.to_string(),
        },
    }
}
