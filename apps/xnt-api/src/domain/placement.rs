//! Order placement outcome.
//!
//! The server answers placement and modification with either an order or a
//! `{group, message}` rejection, sometimes with a success status. Which one
//! arrived is decided by the payload's shape alone.

use serde_json::Value;

use crate::domain::ApiVersion;
use crate::domain::models::Reject;
use crate::registry::{DecodeError, ModelRegistry, Versioned};
use crate::serialization;

/// Either the accepted entity or the server's rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement<T> {
    /// The server accepted the request.
    Accepted(T),
    /// The server refused the request.
    Rejected(Reject),
}

impl<T> Placement<T> {
    /// The accepted entity, if any.
    #[must_use]
    pub fn accepted(self) -> Option<T> {
        match self {
            Self::Accepted(entity) => Some(entity),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection, if any.
    #[must_use]
    pub const fn rejection(&self) -> Option<&Reject> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(reject) => Some(reject),
        }
    }

    /// Whether the request was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

impl<T: Versioned> Placement<T> {
    /// Decode one object as `T` at `version`, falling back to [`Reject`].
    ///
    /// A payload that fits the `T` shape is decoded as `T`; otherwise a
    /// payload that fits `Reject` becomes [`Placement::Rejected`]. Anything
    /// else is decoded as `T`, so strict mode reports the `T` mismatch.
    pub fn decode(
        registry: &ModelRegistry,
        data: &Value,
        version: ApiVersion,
        strict: bool,
    ) -> Result<Option<Self>, DecodeError> {
        let variant = registry.variant::<T>(version)?;
        if !variant.fits(data) && serialization::fits::<Reject>(data) {
            let reject = serialization::decode_one::<Reject>(data, strict)?;
            return Ok(reject.map(Self::Rejected));
        }
        let decoded = variant
            .decode(data, strict)?
            .and_then(serialization::Decoded::into_one);
        Ok(decoded.map(Self::Accepted))
    }

    /// Decode an object or a list, each item independently.
    pub fn decode_all(
        registry: &ModelRegistry,
        data: &Value,
        version: ApiVersion,
        strict: bool,
    ) -> Result<Vec<Self>, DecodeError> {
        match data {
            Value::Array(items) => {
                let mut placements = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(placement) = Self::decode(registry, item, version, strict)? {
                        placements.push(placement);
                    }
                }
                Ok(placements)
            }
            other => Ok(Self::decode(registry, other, version, strict)?
                .into_iter()
                .collect()),
        }
    }
}
