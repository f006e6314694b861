#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! XNT API - Typed client for a versioned trading-data HTTP API
//!
//! The API exists in three wire versions (1.0, 2.0, 3.0) whose payloads
//! differ in field names and nesting. This crate maps every payload onto a
//! typed model of the right version, authenticates with Basic credentials or
//! rotated HS256 bearer tokens, and consumes the newline-delimited JSON
//! streams with automatic reconnection.
//!
//! # Layers (inside → outside)
//!
//! - **Serialization**: wire conventions shared by every model
//!   - camelCase keys, exact decimals, flexible timestamps, shape checks
//!
//! - **Domain**: Versioned wire models and the placement outcome
//!   - `models`: per-version shapes grouped into one enum per abstract type
//!   - `placement`: accepted entity or business rejection
//!
//! - **Registry**: `(abstract type, version)` to schema variant resolution
//!
//! - **Application**: API facade and port definitions
//!   - `api`: every REST endpoint and stream opener
//!   - `ports`: `TokenSource`, read access to the current bearer token
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `auth`: Basic credentials and the rotating `TokenProvider`
//!   - `http`: `reqwest` transport with timeouts and retries
//!   - `stream`: reconnecting stream consumers
//!   - `config`: configuration from code or environment
//!
//! # Data Flow
//!
//! ```text
//!   HttpApi ──► HttpTransport ──► REST ──► JSON ──┐
//!      │                                          ├──► ModelRegistry ──► QuoteV3, OrderV2, ...
//!      └────► StreamConsumer ◄── NDJSON stream ───┘
//!                   │
//!                   └──► queue ──► get(block, timeout, raise_on_empty)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use xnt_api::{ApiVersion, ClientConfig, FeedLevel, HttpApi};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpApi::new(ClientConfig::basic("app-id", "access-key").with_version(ApiVersion::V3))?;
//! let accounts = api.user_accounts(None).await?;
//! let mut quotes = api.quote_stream(&["AAPL.NASDAQ"], FeedLevel::BestPrice, None)?;
//! while let Some(quote) = quotes.get(true, None, false).await? {
//!     println!("{:?} {:?}", quote.symbol_id(), quote.mid());
//! }
//! quotes.stop().await;
//! # drop(accounts);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Serialization layer - wire conventions shared by every model.
pub mod serialization;

/// Domain layer - Versioned wire models.
pub mod domain;

/// Registry of schema variants per abstract type and version.
pub mod registry;

/// Application layer - API facade and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::models::{
    Change, DataType, Execution, FeedLevel, InstrumentType, Order, OrderRequest, OrderTicket,
    Quote, Reject, Scope, Summary, Symbol, Trade, Transaction,
};
pub use domain::{ApiVersion, Placement, UnsupportedVersion};

// Serialization
pub use serialization::{DateFormat, Decoded, Model, SchemaError, Timestamp};

// Registry
pub use registry::{AbstractType, DecodeError, ModelRegistry, RegistryError, Versioned};

// Application
pub use application::ports::{StaticToken, Token, TokenSource};
pub use application::{ApiError, HttpApi};

// Infrastructure
pub use infrastructure::auth::{AuthError, Authenticator, JwtSettings, TokenProvider};
pub use infrastructure::config::{AuthMethod, ClientConfig, ConfigError};
pub use infrastructure::http::{RetryConfig, TransportError};
pub use infrastructure::stream::{
    ReconnectConfig, ReconnectMode, StreamConsumer, StreamError, StreamSettings, StreamState,
};
