//! Client Configuration Settings
//!
//! Configuration types for the API client, loaded from environment variables.

use std::time::Duration;

use crate::domain::ApiVersion;
use crate::domain::models::Scope;
use crate::infrastructure::auth::JwtSettings;
use crate::infrastructure::http::RetryConfig;
use crate::infrastructure::stream::{ReconnectConfig, ReconnectMode, StreamSettings};

/// Default API root.
pub const DEFAULT_URL: &str = "https://api-live.exante.eu";

/// Default lifetime of minted bearer tokens.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Default bound on each REST request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// How requests are authenticated.
#[derive(Clone)]
pub enum AuthMethod {
    /// HTTP Basic with the application id and access key.
    Basic {
        /// Application id.
        app_id: String,
        /// Access key.
        access_key: String,
    },
    /// Bearer tokens minted and rotated from these settings.
    Jwt(JwtSettings),
}

impl AuthMethod {
    /// Scheme name, `basic` or `jwt`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Jwt(_) => "jwt",
        }
    }
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { .. } => f
                .debug_struct("Basic")
                .field("app_id", &"[REDACTED]")
                .field("access_key", &"[REDACTED]")
                .finish(),
            Self::Jwt(settings) => f.debug_tuple("Jwt").field(settings).finish(),
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without version.
    pub url: String,
    /// Version used when a call does not override it.
    pub version: ApiVersion,
    /// Authentication scheme and credentials.
    pub auth: AuthMethod,
    /// Bound on each REST request and each connection attempt.
    pub timeout: Duration,
    /// REST retry budget.
    pub retry: RetryConfig,
    /// Fail on payloads that do not fit their model instead of skipping them.
    pub strict: bool,
    /// Stream consumer tuning.
    pub stream: StreamSettings,
}

impl ClientConfig {
    /// Configuration for `auth` against the default URL.
    #[must_use]
    pub fn new(auth: AuthMethod) -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            version: ApiVersion::default(),
            auth,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryConfig::default(),
            strict: false,
            stream: StreamSettings::default(),
        }
    }

    /// Configuration using HTTP Basic authentication.
    #[must_use]
    pub fn basic(app_id: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self::new(AuthMethod::Basic {
            app_id: app_id.into(),
            access_key: access_key.into(),
        })
    }

    /// Configuration using rotated bearer tokens.
    #[must_use]
    pub fn jwt(settings: JwtSettings) -> Self {
        Self::new(AuthMethod::Jwt(settings))
    }

    /// Set the API root.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the default version.
    #[must_use]
    pub const fn with_version(mut self, version: ApiVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set strict decoding for REST responses and streams.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self.stream.strict = strict;
        self
    }

    /// Set the stream consumer tuning.
    #[must_use]
    pub fn with_stream(mut self, stream: StreamSettings) -> Self {
        self.stream = stream;
        self
    }

    /// Create configuration from environment variables, loading `.env` first
    /// when one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or empty, or if a
    /// variable holds a value outside its allowed set.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(error = %e, "no .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let version = match env.optional("XNT_API_VERSION") {
            Some(value) => value
                .parse::<ApiVersion>()
                .map_err(|_| ConfigError::invalid("XNT_API_VERSION", &value))?,
            None => ApiVersion::default(),
        };

        let app_id = env.required("XNT_APP_ID")?;
        let auth = match env.optional("XNT_AUTH").as_deref().unwrap_or("basic") {
            "basic" => AuthMethod::Basic {
                app_id,
                access_key: env.required("XNT_ACCESS_KEY")?,
            },
            "jwt" => {
                let ttl = env.duration_secs("XNT_TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL);
                let mut settings = JwtSettings::new(
                    app_id,
                    env.required("XNT_CLIENT_ID")?,
                    env.required("XNT_SHARED_KEY")?,
                    ttl,
                );
                if let Some(list) = env.optional("XNT_SCOPES") {
                    settings = settings.with_scopes(parse_scopes(&list)?);
                }
                AuthMethod::Jwt(settings)
            }
            other => return Err(ConfigError::invalid("XNT_AUTH", other)),
        };

        let defaults = RetryConfig::default();
        let retry = RetryConfig {
            max_attempts: env.number("XNT_RETRY_MAX_ATTEMPTS", defaults.max_attempts),
            interval: env.duration_millis("XNT_RETRY_INTERVAL_MS", defaults.interval),
            max_elapsed: env.duration_secs("XNT_RETRY_MAX_ELAPSED_SECS", defaults.max_elapsed),
        };

        let reconnect = match env.optional("XNT_STREAM_RECONNECT").as_deref() {
            None | Some("immediate") => ReconnectMode::Immediate,
            Some("backoff") => ReconnectMode::Backoff(
                ReconnectConfig::default()
                    .with_max_attempts(env.number("XNT_STREAM_MAX_RECONNECTS", 0)),
            ),
            Some(other) => return Err(ConfigError::invalid("XNT_STREAM_RECONNECT", other)),
        };

        let strict = match env.optional("XNT_STRICT_DECODE").as_deref() {
            None | Some("false" | "0") => false,
            Some("true" | "1") => true,
            Some(other) => return Err(ConfigError::invalid("XNT_STRICT_DECODE", other)),
        };

        let stream = StreamSettings::default()
            .with_reconnect(reconnect)
            .with_idle_timeout(env.duration_secs(
                "XNT_STREAM_IDLE_TIMEOUT_SECS",
                StreamSettings::default().idle_timeout,
            ));

        Ok(Self::new(auth)
            .with_url(env.optional("XNT_URL").unwrap_or_else(|| DEFAULT_URL.to_string()))
            .with_version(version)
            .with_timeout(env.duration_secs("XNT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT))
            .with_retry(retry)
            .with_stream(stream)
            .with_strict(strict))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable holds a value outside its allowed set.
    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: &str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

fn parse_scopes(list: &str) -> Result<Vec<Scope>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| Scope::parse(token).ok_or_else(|| ConfigError::invalid("XNT_SCOPES", token)))
        .collect()
}

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).map(|value| value.trim().to_string())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        let value = self
            .optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
        if value.is_empty() {
            return Err(ConfigError::EmptyValue(key.to_string()));
        }
        Ok(value)
    }

    fn number(&self, key: &str, default: u32) -> u32 {
        self.optional(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn duration_secs(&self, key: &str, default: Duration) -> Duration {
        self.optional(key)
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(default, Duration::from_secs)
    }

    fn duration_millis(&self, key: &str, default: Duration) -> Duration {
        self.optional(key)
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(default, Duration::from_millis)
    }
}
