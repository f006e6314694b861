//! Error type of the API facade.

use thiserror::Error;

use crate::domain::ApiVersion;
use crate::infrastructure::auth::AuthError;
use crate::infrastructure::config::ConfigError;
use crate::infrastructure::http::TransportError;
use crate::infrastructure::stream::StreamError;
use crate::registry::{DecodeError, RegistryError};
use crate::serialization::SchemaError;

/// Errors returned by [`HttpApi`](super::api::HttpApi).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Credentials were rejected before any request was sent.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A model could not be resolved for the requested version.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The request could not be completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response did not fit its model in strict mode.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A stream consumer could not be started.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// The endpoint does not exist in the requested version.
    #[error("{operation} is not available in API version {version}")]
    Unsupported {
        /// Facade method name.
        operation: &'static str,
        /// Requested version.
        version: ApiVersion,
    },
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Resolve(e) => Self::Registry(e),
            DecodeError::Schema(e) => Self::Schema(e),
        }
    }
}

impl ApiError {
    /// Whether the failure happened before a response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
