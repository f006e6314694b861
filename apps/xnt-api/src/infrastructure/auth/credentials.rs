//! Request authentication.

use std::fmt;
use std::sync::Arc;

use reqwest::RequestBuilder;

use super::AuthError;
use crate::application::ports::TokenSource;

/// How each request is authenticated.
#[derive(Clone)]
pub enum Authenticator {
    /// HTTP Basic with the application id and access key.
    Basic {
        /// Application id.
        app_id: String,
        /// Access key.
        access_key: String,
    },
    /// Bearer token read from a [`TokenSource`] on every request.
    Bearer(Arc<dyn TokenSource>),
}

impl Authenticator {
    /// Basic credentials, rejecting empty values.
    pub fn basic(app_id: impl Into<String>, access_key: impl Into<String>) -> Result<Self, AuthError> {
        let app_id = app_id.into();
        let access_key = access_key.into();
        if app_id.is_empty() {
            return Err(AuthError::EmptyCredential("app_id"));
        }
        if access_key.is_empty() {
            return Err(AuthError::EmptyCredential("access_key"));
        }
        Ok(Self::Basic { app_id, access_key })
    }

    /// Bearer credentials backed by `source`.
    pub fn bearer(source: Arc<dyn TokenSource>) -> Self {
        Self::Bearer(source)
    }

    /// Add the authorization header to `request`.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Basic { app_id, access_key } => request.basic_auth(app_id, Some(access_key)),
            Self::Bearer(source) => request.bearer_auth(source.current().value()),
        }
    }

    /// Scheme name, for logs.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Bearer(_) => "bearer",
        }
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { app_id, .. } => f
                .debug_struct("Basic")
                .field("app_id", app_id)
                .field("access_key", &"[REDACTED]")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
        }
    }
}
