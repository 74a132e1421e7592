//! Authentication module for BingX API.
//!
//! This module provides:
//! - Credential management with secure secret storage
//! - Millisecond timestamps injected into every request
//! - HMAC-SHA256 signature generation over the canonical query string

mod credentials;
mod signature;
mod timestamp;

pub use credentials::{Credentials, CredentialsProvider, EnvCredentials, StaticCredentials};
pub use signature::{canonicalize, sign, sign_request};
pub(crate) use signature::{SIGNATURE_PARAM, TIMESTAMP_PARAM};
pub use timestamp::{FixedTimestamp, SystemClock, TimestampProvider};
