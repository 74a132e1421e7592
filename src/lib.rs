//! # BingX Client
//!
//! A typed Rust client library for the BingX exchange REST API.
//!
//! ## Features
//!
//! - Blocking and async clients sharing one request pipeline
//! - HMAC-SHA256 request signing
//! - Response caching in memory or Redis, with per-request TTLs
//! - Typed errors for every documented BingX error code
//! - Schema drift tolerance: payloads that no longer match a model are kept
//! - Financial precision with `rust_decimal`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bingx_api_client::rest::BingxClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BingxClient::new();
//!     client.connect()?;
//!     let time = client.get_server_time().await?;
//!     println!("Server time: {}", time.server_time);
//!     Ok(())
//! }
//! ```
//!
//! ## Caching
//!
//! Every client reads the process-wide [`cache::CacheConfig`] by default.
//! Requests that opt in with [`rest::RequestSpec::cached`] are served from it
//! while fresh. Only GET requests are cached unless
//! [`cache::enable_unsafe_cache`] is called.
//!
//! ```rust,no_run
//! use bingx_api_client::cache::{self, CacheKind, RedisSettings};
//!
//! cache::set_cache(CacheKind::AsyncRedis, &RedisSettings::new("localhost", 6379))?;
//! # Ok::<(), bingx_api_client::BingxError>(())
//! ```

pub mod account;
pub mod auth;
pub mod cache;
pub mod error;
pub mod rest;
pub mod spot;
pub mod swap;
pub mod types;

// Re-export commonly used types at crate root
pub use error::BingxError;
pub use rest::{BingxClient, BlockingBingxClient};

/// Result type alias using BingxError
pub type Result<T> = std::result::Result<T, BingxError>;
