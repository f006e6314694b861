//! HTTP client wrapper with retry logic.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use super::error::TransportError;
use super::retry::{ConstantBackoff, RetryConfig};
use crate::domain::ApiVersion;
use crate::infrastructure::auth::Authenticator;

/// Which half of the API a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiArea {
    /// Market data, `{url}/md/{version}`.
    MarketData,
    /// Trading, `{url}/trade/{version}`.
    Trade,
}

impl ApiArea {
    /// Path segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarketData => "md",
            Self::Trade => "trade",
        }
    }
}

/// Percent-encode one symbol for use as a path segment.
#[must_use]
pub fn resolve_symbol(symbol: &str) -> String {
    urlencoding::encode(symbol).into_owned()
}

/// Percent-encode several symbols and join them with `,`.
#[must_use]
pub fn resolve_symbols<S: AsRef<str>>(symbols: &[S]) -> String {
    symbols
        .iter()
        .map(|symbol| resolve_symbol(symbol.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Everything a stream consumer needs to (re)open one subscription.
#[derive(Debug, Clone)]
pub struct StreamTarget {
    client: Client,
    auth: Authenticator,
    url: String,
    query: Vec<(&'static str, String)>,
}

impl StreamTarget {
    /// Target `url` with `query`, authenticated by `auth`.
    #[must_use]
    pub const fn new(
        client: Client,
        auth: Authenticator,
        url: String,
        query: Vec<(&'static str, String)>,
    ) -> Self {
        Self {
            client,
            auth,
            url,
            query,
        }
    }

    /// Stream URL without the query.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send the streaming GET with a fresh authorization header.
    pub async fn connect(&self) -> Result<Response, reqwest::Error> {
        let request = self
            .client
            .get(&self.url)
            .query(&self.query)
            .header(reqwest::header::ACCEPT, "application/x-json-stream");
        self.auth.apply(request).send().await
    }
}

/// HTTP transport for the REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    auth: Authenticator,
    timeout: Duration,
    retry: RetryConfig,
}

impl HttpTransport {
    /// Create a transport for `base_url`.
    ///
    /// `timeout` bounds each REST request and each connection attempt.
    /// Streams are not bounded by it as a whole.
    pub fn new(
        base_url: impl Into<String>,
        auth: Authenticator,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            timeout,
            retry,
        })
    }

    /// Full URL of `path` under `area` at `version`.
    #[must_use]
    pub fn endpoint(&self, area: ApiArea, version: ApiVersion, path: &str) -> String {
        format!("{}/{}/{}{path}", self.base_url, area.as_str(), version.as_str())
    }

    /// Stream subscription target for `path`.
    #[must_use]
    pub fn stream_target(
        &self,
        area: ApiArea,
        version: ApiVersion,
        path: &str,
        query: Vec<(&'static str, String)>,
    ) -> StreamTarget {
        StreamTarget::new(
            self.client.clone(),
            self.auth.clone(),
            self.endpoint(area, version, path),
            query,
        )
    }

    /// GET `path`, returning the JSON body if there is one.
    pub async fn get(
        &self,
        area: ApiArea,
        version: ApiVersion,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Option<Value>, TransportError> {
        self.request(Method::GET, area, version, path, query, None).await
    }

    /// POST `body` to `path`, returning the JSON body if there is one.
    pub async fn post(
        &self,
        area: ApiArea,
        version: ApiVersion,
        path: &str,
        body: &Value,
    ) -> Result<Option<Value>, TransportError> {
        self.request(Method::POST, area, version, path, &[], Some(body))
            .await
    }

    async fn request(
        &self,
        method: Method,
        area: ApiArea,
        version: ApiVersion,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> Result<Option<Value>, TransportError> {
        let url = self.endpoint(area, version, path);
        let mut backoff = ConstantBackoff::new(&self.retry);
        tracing::debug!(method = %method, url = %url, params = ?query, "sending request");

        loop {
            match self.attempt(method.clone(), &url, query, body).await {
                Ok(text) => return Ok(parse_body(&text, &url)),
                Err(e) if e.is_transient() => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempts(),
                            "connection error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(TransportError::MaxRetriesExceeded {
                        attempts: backoff.attempts(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One send plus the full body read. A stall or reset while the body is
    /// streaming fails the attempt just like one before the headers.
    async fn attempt(
        &self,
        method: Method,
        url: &str,
        query: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> Result<String, TransportError> {
        let response = self
            .build(method, url, query, body)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_owned(),
                source,
            })?;
        log_status(response.status(), url);
        response.text().await.map_err(|source| TransportError::Body {
            url: url.to_owned(),
            source,
        })
    }

    fn build(
        &self,
        method: Method,
        url: &str,
        query: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        self.auth.apply(request)
    }
}

fn log_status(status: StatusCode, url: &str) {
    if status.as_u16() > 204 {
        tracing::error!(status = status.as_u16(), url = %url, "request failed");
    } else {
        tracing::info!(status = status.as_u16(), url = %url, "request completed");
    }
}

fn parse_body(text: &str, url: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, url = %url, body = %text, "response is not JSON");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(
            base,
            Authenticator::basic("app", "key").unwrap(),
            Duration::from_secs(5),
            RetryConfig::none(),
        )
        .unwrap()
    }

    #[test_case(ApiArea::MarketData, ApiVersion::V2, "https://api.test/md/2.0/accounts")]
    #[test_case(ApiArea::Trade, ApiVersion::V3, "https://api.test/trade/3.0/accounts")]
    #[test_case(ApiArea::MarketData, ApiVersion::V1, "https://api.test/md/1.0/accounts")]
    fn endpoints_embed_version(area: ApiArea, version: ApiVersion, expected: &str) {
        assert_eq!(transport("https://api.test/").endpoint(area, version, "/accounts"), expected);
    }

    #[test]
    fn symbols_are_percent_encoded() {
        assert_eq!(resolve_symbol("EUR/USD.E.FX"), "EUR%2FUSD.E.FX");
        assert_eq!(
            resolve_symbols(&["AAPL.NASDAQ", "EUR/USD.E.FX"]),
            "AAPL.NASDAQ,EUR%2FUSD.E.FX"
        );
        assert_eq!(resolve_symbol("ED.FORTS.Z2020.C1_1"), "ED.FORTS.Z2020.C1_1");
    }

    #[test]
    fn non_json_bodies_yield_nothing() {
        assert_eq!(parse_body("<html>oops</html>", "u"), None);
        assert_eq!(parse_body("  ", "u"), None);
        assert_eq!(parse_body(r#"{"a": 1}"#, "u"), Some(json!({"a": 1})));
    }
}
