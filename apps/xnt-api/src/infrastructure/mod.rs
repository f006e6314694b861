//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete transports, credentials and
//! configuration sources used by the application layer.

/// Basic and bearer authentication, including token rotation.
pub mod auth;

/// Configuration loading.
pub mod config;

/// REST transport over `reqwest`.
pub mod http;

/// Reconnecting newline-delimited JSON stream consumers.
pub mod stream;
