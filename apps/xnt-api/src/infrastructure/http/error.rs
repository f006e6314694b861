//! Transport errors.

use thiserror::Error;

/// Failures talking to the server. Status codes are not errors here; the
/// body of any response is returned for decoding.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be built.
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A request failed in a way that is not retried.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Target URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// Connection errors or timeouts persisted past the retry budget.
    #[error("max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// The response body could not be read.
    #[error("could not read response body from {url}: {source}")]
    Body {
        /// Target URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// Whether the failure was a connection problem rather than a bad request.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::MaxRetriesExceeded { .. })
    }

    /// Connect failures and timeouts, on send or while the body streams in,
    /// plus a connection cut mid-body. These are worth another attempt.
    pub(crate) fn is_transient(&self) -> bool {
        match self {
            Self::Request { source, .. } => source.is_connect() || source.is_timeout(),
            Self::Body { source, .. } => {
                source.is_connect() || source.is_timeout() || source.is_body()
            }
            Self::Client(_) | Self::MaxRetriesExceeded { .. } => false,
        }
    }
}
