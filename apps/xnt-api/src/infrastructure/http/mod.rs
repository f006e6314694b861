//! HTTP Transport
//!
//! Thin request layer over `reqwest`: version-prefixed URLs, authentication,
//! a fixed per-request timeout and constant-interval retries on connection
//! failures and timeouts. Response bodies are handed back as raw JSON for the
//! registry to decode.

mod client;
mod error;
mod retry;

pub use client::{ApiArea, HttpTransport, StreamTarget, resolve_symbol, resolve_symbols};
pub use error::TransportError;
pub use retry::{ConstantBackoff, RetryConfig};
