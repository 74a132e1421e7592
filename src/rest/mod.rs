//! BingX REST API clients.
//!
//! Two clients share one request pipeline:
//!
//! - [`BingxClient`] suspends the calling task on I/O
//! - [`BlockingBingxClient`] blocks the calling thread
//!
//! Both are built from [`BingxClientBuilder`], start disconnected, and expose
//! the same surface: a low-level [`RequestSpec`] entry point, `get`/`post`/
//! `put`/`delete` shortcuts, and the typed endpoint methods defined in
//! [`crate::account`], [`crate::spot`] and [`crate::swap`].

mod blocking;
mod client;
mod decode;
mod endpoint;
pub mod endpoints;
mod executor;
mod request;
mod session;
mod transport;

pub use blocking::BlockingBingxClient;
pub use client::{BingxClient, BingxClientBuilder, DEFAULT_CACHE_TTL};
pub use decode::{Decoded, decode, validate};
pub use endpoint::Endpoint;
pub(crate) use endpoint::facade;
pub use request::{Method, Params, RequestSpec, SignatureOverride};
pub use session::{Lifecycle, Session};
pub use transport::{
    AsyncTransport, BlockingTransport, DEFAULT_TIMEOUT, DispatchMode, PreparedRequest, RawResponse,
    Transport, TransportSettings,
};
