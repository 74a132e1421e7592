//! Typed endpoint definitions.
//!
//! An [`Endpoint`] describes one BingX operation: how its parameters become a
//! [`RequestSpec`] and how the decoded response becomes the value handed to
//! the caller. Both clients run any endpoint through `call`, and the
//! `facade!` macro generates a named method for it on each client from a
//! single definition.

use serde::de::DeserializeOwned;

use crate::error::BingxError;
use crate::rest::RequestSpec;

/// One typed BingX operation.
pub trait Endpoint {
    /// Model of the whole response payload.
    type Response: DeserializeOwned;
    /// Value returned to the caller.
    type Output;

    /// Build the request.
    fn spec(&self) -> Result<RequestSpec, BingxError>;

    /// Extract the caller's value from the decoded response.
    fn output(response: Self::Response) -> Self::Output;
}

/// Generate matching methods on [`BingxClient`](crate::rest::BingxClient)
/// and [`BlockingBingxClient`](crate::rest::BlockingBingxClient).
///
/// ```ignore
/// facade! {
///     /// Get the server time.
///     fn get_server_time() -> ServerTime = ServerTimeRequest;
/// }
/// ```
macro_rules! facade {
    ($(
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $out:ty = $endpoint:expr;
    )*) => {
        impl $crate::rest::BingxClient {
            $(
                $(#[$meta])*
                pub async fn $name(&self, $($arg: $ty),*) -> $crate::Result<$out> {
                    self.call(&$endpoint).await
                }
            )*
        }

        impl $crate::rest::BlockingBingxClient {
            $(
                $(#[$meta])*
                pub fn $name(&self, $($arg: $ty),*) -> $crate::Result<$out> {
                    self.call(&$endpoint)
                }
            )*
        }
    };
}

pub(crate) use facade;
