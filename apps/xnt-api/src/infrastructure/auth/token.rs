//! JWT minting and rotation.
//!
//! # Lifecycle
//!
//! ```text
//! start() ──► mint (synchronous) ──► valid ──► sleep(ttl - margin) ──► mint ──► valid ...
//! ```
//!
//! The first token exists before [`TokenProvider::start`] returns. A background
//! task replaces it every `ttl - refresh_margin`, so a snapshot handed out by
//! [`TokenSource::current`] always has at least the margin left before expiry.
//! Dropping the provider stops the task.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use ring::hmac;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::AuthError;
use crate::application::ports::{Token, TokenSource};
use crate::domain::models::Scope;

/// Default time before expiry at which a token is replaced.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(5);

/// Smallest accepted refresh margin; one claim-time tick.
pub const MIN_REFRESH_MARGIN: Duration = Duration::from_secs(1);

// =============================================================================
// Settings
// =============================================================================

/// Inputs to token minting.
#[derive(Clone)]
pub struct JwtSettings {
    app_id: String,
    client_id: String,
    shared_key: String,
    ttl: Duration,
    refresh_margin: Duration,
    scopes: Vec<Scope>,
}

impl JwtSettings {
    /// Settings with every scope and the default refresh margin.
    pub fn new(
        app_id: impl Into<String>,
        client_id: impl Into<String>,
        shared_key: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            client_id: client_id.into(),
            shared_key: shared_key.into(),
            ttl,
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            scopes: Scope::ALL.to_vec(),
        }
    }

    /// Restrict the token audience.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Replace tokens this long before they expire.
    #[must_use]
    pub const fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Audience scopes.
    #[must_use]
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Interval between mints.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        self.ttl.saturating_sub(self.refresh_margin)
    }

    fn validate(&self) -> Result<(), AuthError> {
        if self.app_id.is_empty() {
            return Err(AuthError::EmptyCredential("app_id"));
        }
        if self.client_id.is_empty() {
            return Err(AuthError::EmptyCredential("client_id"));
        }
        if self.shared_key.is_empty() {
            return Err(AuthError::EmptyCredential("shared_key"));
        }
        if self.scopes.is_empty() {
            return Err(AuthError::NoScopes);
        }
        if self.refresh_margin < MIN_REFRESH_MARGIN {
            return Err(AuthError::MarginTooShort(self.refresh_margin));
        }
        if self.ttl <= self.refresh_margin {
            return Err(AuthError::TtlTooShort {
                ttl: self.ttl,
                margin: self.refresh_margin,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("app_id", &self.app_id)
            .field("client_id", &self.client_id)
            .field("shared_key", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .field("refresh_margin", &self.refresh_margin)
            .field("scopes", &self.scopes)
            .finish()
    }
}

// =============================================================================
// Signing
// =============================================================================

#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    sub: &'a str,
    iat: i64,
    exp: i64,
    aud: Vec<&'static str>,
}

/// HS256 signer for one set of claims.
pub struct JwtSigner {
    key: hmac::Key,
    app_id: String,
    client_id: String,
    ttl: Duration,
    scopes: Vec<Scope>,
}

impl JwtSigner {
    /// Signer for `settings`, which must be valid.
    pub fn new(settings: &JwtSettings) -> Result<Self, AuthError> {
        settings.validate()?;
        Ok(Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, settings.shared_key.as_bytes()),
            app_id: settings.app_id.clone(),
            client_id: settings.client_id.clone(),
            ttl: settings.ttl,
            scopes: settings.scopes.clone(),
        })
    }

    /// Mint a token issued at `now`. Claim times have second precision; both
    /// are rounded down from the exact instants, so `exp` never lands more
    /// than a second before `now + ttl`.
    pub fn sign(&self, now: DateTime<Utc>) -> Result<Token, AuthError> {
        let iat = now.timestamp();
        let exp = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .map_or(i64::MAX, |expiry| expiry.timestamp());
        let header = Header {
            alg: "HS256",
            typ: "JWT",
        };
        let claims = Claims {
            iss: &self.client_id,
            sub: &self.app_id,
            iat,
            exp,
            aud: self.scopes.iter().map(|scope| scope.as_str()).collect(),
        };
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let signature = hmac::sign(&self.key, signing_input.as_bytes());
        let value = format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature.as_ref()));

        let issued_at = DateTime::from_timestamp(iat, 0).unwrap_or(now);
        let expires_at = DateTime::from_timestamp(exp, 0).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Ok(Token::new(value, issued_at, expires_at))
    }
}

impl fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSigner")
            .field("app_id", &self.app_id)
            .field("client_id", &self.client_id)
            .field("key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Provider
// =============================================================================

/// Owner of the token lifecycle.
///
/// Readers go through [`TokenSource`]; only the rotation task writes.
pub struct TokenProvider {
    current: Arc<RwLock<Arc<Token>>>,
    refresh_interval: Duration,
    task: JoinHandle<()>,
}

impl TokenProvider {
    /// Mint the first token and start rotating.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(settings: &JwtSettings) -> Result<Self, AuthError> {
        let handle = Handle::try_current().map_err(|_| AuthError::NoRuntime)?;
        let signer = JwtSigner::new(settings)?;
        let first = signer.sign(Utc::now())?;
        let current = Arc::new(RwLock::new(Arc::new(first)));
        let refresh_interval = settings.refresh_interval();

        tracing::debug!(
            client_id = %settings.client_id,
            ttl_secs = settings.ttl.as_secs(),
            refresh_secs = refresh_interval.as_secs(),
            "token provider started"
        );

        let task = handle.spawn(rotate(signer, Arc::clone(&current), refresh_interval));
        Ok(Self {
            current,
            refresh_interval,
            task,
        })
    }

    /// Interval between mints.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }
}

impl TokenSource for TokenProvider {
    fn current(&self) -> Arc<Token> {
        Arc::clone(&self.current.read())
    }
}

impl Drop for TokenProvider {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("refresh_interval", &self.refresh_interval)
            .field("token", &self.current.read())
            .finish_non_exhaustive()
    }
}

async fn rotate(signer: JwtSigner, current: Arc<RwLock<Arc<Token>>>, every: Duration) {
    loop {
        tokio::time::sleep(every).await;
        match signer.sign(Utc::now()) {
            Ok(token) => {
                tracing::debug!(expires_at = %token.expires_at(), "token refreshed");
                *current.write() = Arc::new(token);
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, keeping previous token");
            }
        }
    }
}
