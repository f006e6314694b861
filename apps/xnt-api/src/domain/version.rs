//! API wire versions.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A wire version of the HTTP API, embedded in every request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ApiVersion {
    /// `1.0`.
    V1,
    /// `2.0`, the default.
    #[default]
    V2,
    /// `3.0`.
    V3,
}

impl ApiVersion {
    /// Every supported version, oldest first.
    pub const ALL: [Self; 3] = [Self::V1, Self::V2, Self::V3];

    /// Path segment, e.g. `"2.0"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
            Self::V3 => "3.0",
        }
    }

    /// Query key naming an account.
    #[must_use]
    pub const fn account_key(self) -> &'static str {
        match self {
            Self::V3 => "accountId",
            Self::V1 | Self::V2 => "account",
        }
    }

    /// Query key naming a symbol.
    #[must_use]
    pub const fn symbol_key(self) -> &'static str {
        match self {
            Self::V3 => "symbolId",
            Self::V1 | Self::V2 => "instrument",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A version string outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported API version {0:?}, expected one of 1.0, 2.0, 3.0")]
pub struct UnsupportedVersion(pub String);

impl FromStr for ApiVersion {
    type Err = UnsupportedVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.0" => Ok(Self::V1),
            "2.0" => Ok(Self::V2),
            "3.0" => Ok(Self::V3),
            other => Err(UnsupportedVersion(other.to_string())),
        }
    }
}
