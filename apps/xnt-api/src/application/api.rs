//! Typed API facade.
//!
//! [`HttpApi`] maps every REST endpoint and stream of the market data
//! (`/md`) and trading (`/trade`) areas onto the versioned models. Each
//! method accepts an optional version overriding the configured one; the
//! version selects both the URL prefix and the response shape.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Value, json};

use super::error::ApiError;
use super::queries::{Candles, HistoryQuery, OrdersQuery, QueryPairs, ReplaceParams, Ticks, TransactionsQuery};
use crate::application::ports::TokenSource;
use crate::domain::models::{
    CandleDuration, Change, Crossrate, DataType, Exchange, Execution, FeedLevel, Group,
    InstrumentType, ModifyAction, Order, OrderRequest, Quote, Schedule, Summary, Symbol,
    SymbolSpecification, Trade, Transaction, UserAccount,
};
use crate::domain::{ApiVersion, Placement};
use crate::infrastructure::auth::{Authenticator, TokenProvider};
use crate::infrastructure::config::{AuthMethod, ClientConfig};
use crate::infrastructure::http::{ApiArea, HttpTransport, resolve_symbol, resolve_symbols};
use crate::infrastructure::stream::{EventDecoder, StreamConsumer, StreamSettings};
use crate::registry::{ModelRegistry, Versioned};
use crate::serialization::{self, DateFormat, Decoded, Model};

/// Client for the REST endpoints and streams.
///
/// Clones share the connection pool, the registry and the token provider.
#[derive(Debug, Clone)]
pub struct HttpApi {
    transport: HttpTransport,
    registry: Arc<ModelRegistry>,
    version: ApiVersion,
    strict: bool,
    stream: StreamSettings,
    tokens: Option<Arc<TokenProvider>>,
}

impl HttpApi {
    /// Build a client from `config`.
    ///
    /// Credentials are validated, the bearer token (if any) is minted and
    /// every model is checked to resolve at the configured version before
    /// the client is returned. JWT authentication must be set up inside a
    /// Tokio runtime.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let registry = ModelRegistry::new()?;
        registry.ensure_total(config.version)?;

        let (auth, tokens) = match config.auth {
            AuthMethod::Basic { app_id, access_key } => (Authenticator::basic(app_id, access_key)?, None),
            AuthMethod::Jwt(settings) => {
                let provider = Arc::new(TokenProvider::start(&settings)?);
                let source: Arc<dyn TokenSource> = provider.clone();
                (Authenticator::bearer(source), Some(provider))
            }
        };

        tracing::info!(
            url = %config.url,
            version = %config.version,
            auth = auth.scheme(),
            strict = config.strict,
            "api client ready"
        );

        let transport = HttpTransport::new(config.url, auth, config.timeout, config.retry)?;
        Ok(Self {
            transport,
            registry: Arc::new(registry),
            version: config.version,
            strict: config.strict,
            stream: config.stream,
            tokens,
        })
    }

    /// Build a client from `XNT_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Version used when a call does not override it.
    #[must_use]
    pub const fn version(&self) -> ApiVersion {
        self.version
    }

    /// Model registry used for decoding.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Whether schema mismatches fail calls instead of being skipped.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// This client with strict or lenient decoding, for REST calls and
    /// streams alike, leaving the configured mode untouched:
    /// `api.with_strict(false).symbols(None)`.
    #[must_use]
    pub fn with_strict(&self, strict: bool) -> Self {
        Self {
            strict,
            stream: self.stream.clone().with_strict(strict),
            ..self.clone()
        }
    }

    /// Current bearer token source, when JWT authentication is used.
    #[must_use]
    pub fn token_source(&self) -> Option<Arc<dyn TokenSource>> {
        self.tokens
            .as_ref()
            .map(|provider| Arc::clone(provider) as Arc<dyn TokenSource>)
    }

    fn resolve(&self, version: Option<ApiVersion>) -> ApiVersion {
        version.unwrap_or(self.version)
    }

    // =========================================================================
    // Decoding helpers
    // =========================================================================

    async fn get_json(
        &self,
        area: ApiArea,
        version: ApiVersion,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Option<Value>, ApiError> {
        Ok(self.transport.get(area, version, path, query).await?)
    }

    async fn get_versioned<T: Versioned>(
        &self,
        area: ApiArea,
        version: ApiVersion,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Option<Decoded<T>>, ApiError> {
        let Some(body) = self.get_json(area, version, path, query).await? else {
            return Ok(None);
        };
        if is_empty_list(&body) {
            return Ok(Some(Decoded::Many(Vec::new())));
        }
        Ok(self.registry.decode::<T>(&body, version, self.strict)?)
    }

    async fn get_model<M: Model>(
        &self,
        area: ApiArea,
        version: ApiVersion,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Option<Decoded<M>>, ApiError> {
        let Some(body) = self.get_json(area, version, path, query).await? else {
            return Ok(None);
        };
        if is_empty_list(&body) {
            return Ok(Some(Decoded::Many(Vec::new())));
        }
        Ok(serialization::decode::<M>(&body, self.strict)?)
    }

    async fn list<T: Versioned>(
        &self,
        area: ApiArea,
        version: ApiVersion,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Vec<T>, ApiError> {
        Ok(self
            .get_versioned::<T>(area, version, path, query)
            .await?
            .map(Decoded::into_vec)
            .unwrap_or_default())
    }

    async fn one<T: Versioned>(
        &self,
        area: ApiArea,
        version: ApiVersion,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Option<T>, ApiError> {
        Ok(self
            .get_versioned::<T>(area, version, path, query)
            .await?
            .and_then(Decoded::into_one))
    }

    async fn list_models<M: Model>(
        &self,
        version: ApiVersion,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Vec<M>, ApiError> {
        Ok(self
            .get_model::<M>(ApiArea::MarketData, version, path, query)
            .await?
            .map(Decoded::into_vec)
            .unwrap_or_default())
    }

    async fn one_model<M: Model>(
        &self,
        version: ApiVersion,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Option<M>, ApiError> {
        Ok(self
            .get_model::<M>(ApiArea::MarketData, version, path, query)
            .await?
            .and_then(Decoded::into_one))
    }

    // =========================================================================
    // Market data: accounts and reference data
    // =========================================================================

    /// Accounts reachable with the current credentials.
    pub async fn user_accounts(&self, version: Option<ApiVersion>) -> Result<Vec<UserAccount>, ApiError> {
        self.list_models(self.resolve(version), "/accounts", &[]).await
    }

    /// Daily changes of `symbols`, or of every instrument when empty.
    pub async fn changes<S: AsRef<str>>(
        &self,
        symbols: &[S],
        version: Option<ApiVersion>,
    ) -> Result<Vec<Change>, ApiError> {
        let path = if symbols.is_empty() {
            "/change".to_string()
        } else {
            format!("/change/{}", resolve_symbols(symbols))
        };
        self.list(ApiArea::MarketData, self.resolve(version), &path, &[]).await
    }

    /// Currencies with known crossrates.
    pub async fn currencies(&self, version: Option<ApiVersion>) -> Result<Vec<String>, ApiError> {
        let body = self
            .get_json(ApiArea::MarketData, self.resolve(version), "/crossrates", &[])
            .await?;
        Ok(body
            .as_ref()
            .and_then(|body| body.get("currencies"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_owned).collect())
            .unwrap_or_default())
    }

    /// Conversion rate from one currency to another.
    pub async fn crossrate(
        &self,
        from: &str,
        to: &str,
        version: Option<ApiVersion>,
    ) -> Result<Option<Crossrate>, ApiError> {
        let path = format!(
            "/crossrates/{}/{}",
            resolve_symbol(&from.to_uppercase()),
            resolve_symbol(&to.to_uppercase())
        );
        self.one_model(self.resolve(version), &path, &[]).await
    }

    /// Known exchanges.
    pub async fn exchanges(&self, version: Option<ApiVersion>) -> Result<Vec<Exchange>, ApiError> {
        self.list_models(self.resolve(version), "/exchanges", &[]).await
    }

    /// Instruments traded on `exchange`.
    pub async fn symbols_by_exchange(
        &self,
        exchange: &str,
        version: Option<ApiVersion>,
    ) -> Result<Vec<Symbol>, ApiError> {
        let path = format!("/exchanges/{}", resolve_symbol(exchange));
        self.list(ApiArea::MarketData, self.resolve(version), &path, &[]).await
    }

    /// Instrument groups.
    pub async fn groups(&self, version: Option<ApiVersion>) -> Result<Vec<Group>, ApiError> {
        self.list_models(self.resolve(version), "/groups", &[]).await
    }

    /// Instruments of `group`.
    pub async fn symbols_by_group(
        &self,
        group: &str,
        version: Option<ApiVersion>,
    ) -> Result<Vec<Symbol>, ApiError> {
        let path = format!("/groups/{}", resolve_symbol(group));
        self.list(ApiArea::MarketData, self.resolve(version), &path, &[]).await
    }

    /// Instrument of `group` with the nearest expiration. Not available in 3.0.
    pub async fn nearest(&self, group: &str, version: Option<ApiVersion>) -> Result<Option<Symbol>, ApiError> {
        let version = self.resolve(version);
        if version == ApiVersion::V3 {
            return Err(ApiError::Unsupported {
                operation: "nearest",
                version,
            });
        }
        let path = format!("/groups/{}/nearest", resolve_symbol(group));
        self.one(ApiArea::MarketData, version, &path, &[]).await
    }

    /// Every instrument available to the credentials.
    pub async fn symbols(&self, version: Option<ApiVersion>) -> Result<Vec<Symbol>, ApiError> {
        self.list(ApiArea::MarketData, self.resolve(version), "/symbols", &[])
            .await
    }

    /// One instrument.
    pub async fn symbol(&self, symbol: &str, version: Option<ApiVersion>) -> Result<Option<Symbol>, ApiError> {
        let path = format!("/symbols/{}", resolve_symbol(symbol));
        self.one(ApiArea::MarketData, self.resolve(version), &path, &[]).await
    }

    /// Trading sessions of an instrument, with allowed order types when
    /// `types` is set.
    pub async fn symbol_schedule(
        &self,
        symbol: &str,
        types: bool,
        version: Option<ApiVersion>,
    ) -> Result<Option<Schedule>, ApiError> {
        let path = format!("/symbols/{}/schedule", resolve_symbol(symbol));
        self.one_model(self.resolve(version), &path, &[("types", types.to_string())])
            .await
    }

    /// Trading terms of an instrument.
    pub async fn symbol_specification(
        &self,
        symbol: &str,
        version: Option<ApiVersion>,
    ) -> Result<Option<SymbolSpecification>, ApiError> {
        let path = format!("/symbols/{}/specification", resolve_symbol(symbol));
        self.one_model(self.resolve(version), &path, &[]).await
    }

    /// Known instrument types.
    pub async fn types(&self, version: Option<ApiVersion>) -> Result<Vec<InstrumentType>, ApiError> {
        let body = self
            .get_json(ApiArea::MarketData, self.resolve(version), "/types", &[])
            .await?;
        let Some(Value::Array(items)) = body else {
            return Ok(Vec::new());
        };
        let mut types = Vec::with_capacity(items.len());
        for item in items {
            let id = item.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value::<InstrumentType>(id) {
                Ok(kind) => types.push(kind),
                Err(e) if self.strict => {
                    return Err(serialization::SchemaError::Invalid {
                        model: "InstrumentType",
                        payload: item.to_string(),
                        source: e,
                    }
                    .into());
                }
                Err(e) => tracing::warn!(error = %e, payload = %item, "unknown instrument type, skipping"),
            }
        }
        Ok(types)
    }

    /// Instruments of one type.
    pub async fn symbols_by_type(
        &self,
        kind: InstrumentType,
        version: Option<ApiVersion>,
    ) -> Result<Vec<Symbol>, ApiError> {
        let path = format!("/types/{}", kind.as_str());
        self.list(ApiArea::MarketData, self.resolve(version), &path, &[]).await
    }

    // =========================================================================
    // Market data: prices and history
    // =========================================================================

    /// Last quote of each of `symbols`. Market depth needs 2.0 or later.
    pub async fn last_quote<S: AsRef<str>>(
        &self,
        symbols: &[S],
        level: FeedLevel,
        version: Option<ApiVersion>,
    ) -> Result<Vec<Quote>, ApiError> {
        let path = format!("/feed/{}/last", resolve_symbols(symbols));
        self.list(
            ApiArea::MarketData,
            self.resolve(version),
            &path,
            &[("level", level.as_str().to_string())],
        )
        .await
    }

    /// OHLC candles of one instrument. The server returns at most 60 by
    /// default.
    pub async fn ohlc(
        &self,
        symbol: &str,
        duration: CandleDuration,
        query: &HistoryQuery,
        version: Option<ApiVersion>,
    ) -> Result<Candles, ApiError> {
        let version = self.resolve(version);
        let path = format!("/ohlc/{}/{}", resolve_symbol(symbol), duration.as_secs());
        let pairs = query.pairs(60);
        Ok(match query.data_type {
            DataType::Quotes => Candles::Quotes(self.list_models(version, &path, &pairs).await?),
            DataType::Trades => Candles::Trades(self.list_models(version, &path, &pairs).await?),
        })
    }

    /// Raw ticks of one instrument. The server returns at most 1000 by
    /// default.
    pub async fn ticks(
        &self,
        symbol: &str,
        query: &HistoryQuery,
        version: Option<ApiVersion>,
    ) -> Result<Ticks, ApiError> {
        let version = self.resolve(version);
        let path = format!("/ticks/{}", resolve_symbol(symbol));
        let pairs = query.pairs(1000);
        Ok(match query.data_type {
            DataType::Quotes => Ticks::Quotes(self.list(ApiArea::MarketData, version, &path, &pairs).await?),
            DataType::Trades => Ticks::Trades(self.list(ApiArea::MarketData, version, &path, &pairs).await?),
        })
    }

    // =========================================================================
    // Market data: account state
    // =========================================================================

    /// Summary of `account` in `currency`, on `date` or now.
    pub async fn account_summary(
        &self,
        account: &str,
        currency: &str,
        date: Option<NaiveDate>,
        version: Option<ApiVersion>,
    ) -> Result<Option<Summary>, ApiError> {
        let account = resolve_symbol(account);
        let currency = currency.to_uppercase();
        let path = match date {
            Some(day) => format!("/summary/{account}/{}/{currency}", day.format("%Y-%m-%d")),
            None => format!("/summary/{account}/{currency}"),
        };
        self.one(ApiArea::MarketData, self.resolve(version), &path, &[]).await
    }

    /// Transactions matching `query`.
    pub async fn transactions(
        &self,
        query: &TransactionsQuery,
        version: Option<ApiVersion>,
    ) -> Result<Vec<Transaction>, ApiError> {
        self.list(ApiArea::MarketData, self.resolve(version), "/transactions", &query.pairs())
            .await
    }

    // =========================================================================
    // Trading
    // =========================================================================

    /// Place an order.
    ///
    /// The request's own version selects the URL. Every placed order or
    /// rejection is returned, a lone 1.0 object included.
    pub async fn place_order(&self, request: &OrderRequest) -> Result<Vec<Placement<Order>>, ApiError> {
        let version = request.version();
        let body = request.encode(false, &DateFormat::default())?;
        let Some(response) = self.transport.post(ApiArea::Trade, version, "/orders", &body).await? else {
            return Ok(Vec::new());
        };
        Ok(Placement::decode_all(&self.registry, &response, version, self.strict)?)
    }

    /// Historical orders.
    pub async fn orders(&self, query: &OrdersQuery, version: Option<ApiVersion>) -> Result<Vec<Order>, ApiError> {
        let version = self.resolve(version);
        self.list(ApiArea::Trade, version, "/orders", &query.pairs(version))
            .await
    }

    /// Working orders, optionally of one account or instrument.
    pub async fn active_orders(
        &self,
        account: Option<&str>,
        symbol: Option<&str>,
        limit: u32,
        version: Option<ApiVersion>,
    ) -> Result<Vec<Order>, ApiError> {
        let version = self.resolve(version);
        let mut pairs: QueryPairs = vec![("limit", limit.to_string())];
        if let Some(account) = account {
            pairs.push((version.account_key(), account.to_string()));
        }
        if let Some(symbol) = symbol {
            pairs.push((version.symbol_key(), symbol.to_string()));
        }
        self.list(ApiArea::Trade, version, "/orders/active", &pairs).await
    }

    /// One order.
    pub async fn order(&self, order_id: &str, version: Option<ApiVersion>) -> Result<Option<Order>, ApiError> {
        let path = format!("/orders/{}", resolve_symbol(order_id));
        self.one(ApiArea::Trade, self.resolve(version), &path, &[]).await
    }

    /// Cancel a working order.
    pub async fn cancel_order(
        &self,
        order_id: &str,
        version: Option<ApiVersion>,
    ) -> Result<Option<Placement<Order>>, ApiError> {
        self.modify_order(order_id, ModifyAction::Cancel, None, version).await
    }

    /// Change quantity or prices of a working order.
    pub async fn replace_order(
        &self,
        order_id: &str,
        params: &ReplaceParams,
        version: Option<ApiVersion>,
    ) -> Result<Option<Placement<Order>>, ApiError> {
        self.modify_order(order_id, ModifyAction::Replace, Some(params), version)
            .await
    }

    async fn modify_order(
        &self,
        order_id: &str,
        action: ModifyAction,
        params: Option<&ReplaceParams>,
        version: Option<ApiVersion>,
    ) -> Result<Option<Placement<Order>>, ApiError> {
        let version = self.resolve(version);
        let mut body = json!({ "action": action });
        if let Some(params) = params {
            body["parameters"] = params.to_json();
        }
        let path = format!("/orders/{}", resolve_symbol(order_id));
        let Some(response) = self.transport.post(ApiArea::Trade, version, &path, &body).await? else {
            return Ok(None);
        };
        Ok(Placement::decode(&self.registry, &response, version, self.strict)?)
    }

    // =========================================================================
    // Streams
    // =========================================================================

    fn open_stream<T: Versioned>(
        &self,
        area: ApiArea,
        version: ApiVersion,
        path: &str,
        query: QueryPairs,
        decoder: EventDecoder,
    ) -> Result<StreamConsumer<T>, ApiError> {
        let variant = self.registry.variant::<T>(version)?;
        let target = self.transport.stream_target(area, version, path, query);
        Ok(StreamConsumer::spawn(target, decoder, variant, self.stream.clone())?)
    }

    /// Live quotes of `symbols`.
    pub fn quote_stream<S: AsRef<str>>(
        &self,
        symbols: &[S],
        level: FeedLevel,
        version: Option<ApiVersion>,
    ) -> Result<StreamConsumer<Quote>, ApiError> {
        let path = format!("/feed/{}", resolve_symbols(symbols));
        self.open_stream(
            ApiArea::MarketData,
            self.resolve(version),
            &path,
            vec![("level", level.as_str().to_string())],
            EventDecoder::new(),
        )
    }

    /// Live trades of `symbols`. Only available in 3.0.
    pub fn trade_stream<S: AsRef<str>>(
        &self,
        symbols: &[S],
        version: Option<ApiVersion>,
    ) -> Result<StreamConsumer<Trade>, ApiError> {
        let version = self.resolve(version);
        if version != ApiVersion::V3 {
            return Err(ApiError::Unsupported {
                operation: "trade_stream",
                version,
            });
        }
        let path = format!("/feed/trades/{}", resolve_symbols(symbols));
        self.open_stream(ApiArea::MarketData, version, &path, Vec::new(), EventDecoder::new())
    }

    /// Updates of the credentials' orders.
    pub fn orders_stream(&self, version: Option<ApiVersion>) -> Result<StreamConsumer<Order>, ApiError> {
        self.open_stream(
            ApiArea::Trade,
            self.resolve(version),
            "/stream/orders",
            Vec::new(),
            EventDecoder::with_filter("order"),
        )
    }

    /// Executions of the credentials' orders.
    pub fn executions_stream(&self, version: Option<ApiVersion>) -> Result<StreamConsumer<Execution>, ApiError> {
        let version = self.resolve(version);
        let decoder = if version == ApiVersion::V3 {
            EventDecoder::with_filter("trade")
        } else {
            EventDecoder::new()
        };
        self.open_stream(ApiArea::Trade, version, "/stream/trades", Vec::new(), decoder)
    }
}

fn is_empty_list(body: &Value) -> bool {
    matches!(body, Value::Array(items) if items.is_empty())
}
