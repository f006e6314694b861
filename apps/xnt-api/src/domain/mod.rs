//! Domain Layer - Versioned wire models and API versions.
//!
//! Pure data types: every model here is a serde struct with the API's
//! camelCase wire mapping, plus the enums that group the per-version shapes
//! of one abstract type.

/// Wire models for all API versions.
pub mod models;

/// Outcome of order placement and modification.
pub mod placement;

/// API wire versions.
pub mod version;

pub use placement::Placement;
pub use version::{ApiVersion, UnsupportedVersion};
