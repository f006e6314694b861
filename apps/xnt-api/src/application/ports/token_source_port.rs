//! Token Source Port
//!
//! Readers take an immutable snapshot of the token for each request. The
//! writer swaps in a new snapshot; a reader holding the old one is never
//! affected.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// A signed bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Token {
    /// Wrap an already signed token.
    pub fn new(value: impl Into<String>, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            issued_at,
            expires_at,
        }
    }

    /// Compact serialized token.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// When the token was minted.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the token stops being accepted.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token is still valid at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Port for reading the current bearer token.
pub trait TokenSource: Send + Sync {
    /// Snapshot of the token to use for the next request.
    fn current(&self) -> Arc<Token>;
}

/// A token that never rotates. Useful for tokens minted elsewhere.
#[derive(Debug, Clone)]
pub struct StaticToken(Arc<Token>);

impl StaticToken {
    /// Serve `token` forever.
    #[must_use]
    pub fn new(token: Token) -> Self {
        Self(Arc::new(token))
    }
}

impl TokenSource for StaticToken {
    fn current(&self) -> Arc<Token> {
        Arc::clone(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn debug_redacts_value() {
        let now = Utc::now();
        let token = Token::new("secret.jwt.value", now, now + Duration::seconds(60));
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret.jwt.value"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn validity_is_strict() {
        let now = Utc::now();
        let token = Token::new("t", now, now + Duration::seconds(1));
        assert!(token.is_valid_at(now));
        assert!(!token.is_valid_at(token.expires_at()));
    }

    #[test]
    fn static_source_hands_out_same_snapshot() {
        let now = Utc::now();
        let source = StaticToken::new(Token::new("t", now, now + Duration::seconds(60)));
        assert!(Arc::ptr_eq(&source.current(), &source.current()));
    }
}
