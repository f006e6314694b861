//! Application Layer - Ports and the API facade.
//!
//! The facade drives requests and stream subscriptions through the ports
//! defined here; infrastructure adapters implement them.

/// Typed facade over every REST endpoint and stream.
pub mod api;

/// Facade error type.
pub mod error;

/// Port interfaces for credential sources.
pub mod ports;

/// Request filters and multi-shape results.
pub mod queries;

pub use api::HttpApi;
pub use error::ApiError;
pub use queries::{Candles, HistoryQuery, OrdersQuery, ReplaceParams, Ticks, TransactionsQuery};
