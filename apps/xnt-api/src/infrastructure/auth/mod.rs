//! Authentication
//!
//! Two schemes are supported:
//!
//! - HTTP Basic with the application id and access key
//! - Bearer JWT (HS256) minted from the client id and shared key, rotated by
//!   a background [`TokenProvider`] before it expires

mod credentials;
mod token;

use std::time::Duration;

use thiserror::Error;

pub use credentials::Authenticator;
pub use token::{DEFAULT_REFRESH_MARGIN, JwtSettings, JwtSigner, MIN_REFRESH_MARGIN, TokenProvider};

/// Errors raised while building credentials or minting tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A credential field is empty.
    #[error("credential {0} cannot be empty")]
    EmptyCredential(&'static str),

    /// A token must request at least one scope.
    #[error("at least one scope is required")]
    NoScopes,

    /// The token would expire before it is refreshed.
    #[error("token ttl {ttl:?} must exceed the refresh margin {margin:?}")]
    TtlTooShort {
        /// Requested lifetime.
        ttl: Duration,
        /// Time before expiry at which tokens are replaced.
        margin: Duration,
    },

    /// Claim times are whole seconds, so a shorter margin could let the
    /// current token lapse before its replacement is minted.
    #[error("refresh margin {0:?} is below {min:?}", min = MIN_REFRESH_MARGIN)]
    MarginTooShort(Duration),

    /// The provider's rotation task needs a Tokio runtime.
    #[error("token provider must be started inside a Tokio runtime")]
    NoRuntime,

    /// Claims could not be serialized.
    #[error("could not encode token claims: {0}")]
    Encode(#[from] serde_json::Error),
}
