//! Request filters and multi-shape results of the REST facade.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::ApiVersion;
use crate::domain::models::{DataType, OhlcQuotes, OhlcTrades, Ordering, Quote, Trade};
use crate::serialization::ISO_FORMAT;

/// Query pairs as sent on the wire.
pub type QueryPairs = Vec<(&'static str, String)>;

fn push(pairs: &mut QueryPairs, key: &'static str, value: Option<impl ToString>) {
    if let Some(value) = value {
        pairs.push((key, value.to_string()));
    }
}

/// Window of a candle or tick query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Quote or trade based data.
    pub data_type: DataType,
    /// Window start.
    pub from: Option<DateTime<Utc>>,
    /// Window end.
    pub to: Option<DateTime<Utc>>,
    /// Maximum number of items; the server may return fewer.
    pub limit: Option<u32>,
}

impl HistoryQuery {
    /// Query for `data_type` with the server's default window.
    #[must_use]
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            ..Self::default()
        }
    }

    /// Restrict the window.
    #[must_use]
    pub const fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Set the item limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn pairs(&self, default_limit: u32) -> QueryPairs {
        let mut pairs = vec![
            ("size", self.limit.unwrap_or(default_limit).to_string()),
            ("type", self.data_type.as_str().to_string()),
        ];
        push(&mut pairs, "from", self.from.map(|at| at.timestamp_millis()));
        push(&mut pairs, "to", self.to.map(|at| at.timestamp_millis()));
        pairs
    }
}

/// Filter of historical orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdersQuery {
    /// Restrict to one account.
    pub account: Option<String>,
    /// Maximum number of orders.
    pub limit: u32,
    /// Placed at or after.
    pub from: Option<DateTime<Utc>>,
    /// Placed before.
    pub to: Option<DateTime<Utc>>,
}

impl Default for OrdersQuery {
    fn default() -> Self {
        Self {
            account: None,
            limit: 1000,
            from: None,
            to: None,
        }
    }
}

impl OrdersQuery {
    /// Restrict to one account.
    #[must_use]
    pub fn for_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Set the order limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Restrict the placement window.
    #[must_use]
    pub const fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub(crate) fn pairs(&self, version: ApiVersion) -> QueryPairs {
        let mut pairs = vec![("limit", self.limit.to_string())];
        push(&mut pairs, "from", self.from.map(|at| at.format(ISO_FORMAT)));
        push(&mut pairs, "to", self.to.map(|at| at.format(ISO_FORMAT)));
        push(&mut pairs, version.account_key(), self.account.as_deref());
        pairs
    }
}

/// Filter of account transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionsQuery {
    /// Restrict to one account.
    pub account: Option<String>,
    /// Restrict to one transaction.
    pub uuid: Option<String>,
    /// Restrict to one instrument.
    pub symbol: Option<String>,
    /// Restrict to one asset.
    pub asset: Option<String>,
    /// Restrict to these operation types.
    pub operation_types: Vec<String>,
    /// Restrict to one order.
    pub order_id: Option<String>,
    /// Restrict to one position within the order.
    pub order_pos: Option<i64>,
    /// Items to skip, for pagination.
    pub offset: Option<u64>,
    /// Maximum number of items.
    pub limit: u64,
    /// Sort direction.
    pub order: Ordering,
    /// First day, inclusive.
    pub from: Option<NaiveDate>,
    /// Last day, inclusive.
    pub to: Option<NaiveDate>,
}

impl Default for TransactionsQuery {
    fn default() -> Self {
        Self {
            account: None,
            uuid: None,
            symbol: None,
            asset: None,
            operation_types: Vec::new(),
            order_id: None,
            order_pos: None,
            offset: None,
            limit: 10,
            order: Ordering::Asc,
            from: None,
            to: None,
        }
    }
}

impl TransactionsQuery {
    /// Restrict to one account.
    #[must_use]
    pub fn for_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Restrict to one instrument.
    #[must_use]
    pub fn for_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Restrict to these operation types, e.g. `TRADE` or `COMMISSION`.
    #[must_use]
    pub fn with_operation_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.operation_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Set pagination.
    #[must_use]
    pub const fn page(mut self, offset: u64, limit: u64) -> Self {
        self.offset = Some(offset);
        self.limit = limit;
        self
    }

    /// Set the sort direction.
    #[must_use]
    pub const fn ordered(mut self, order: Ordering) -> Self {
        self.order = order;
        self
    }

    /// Restrict to a range of days.
    #[must_use]
    pub const fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub(crate) fn pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push(&mut pairs, "uuid", self.uuid.as_deref());
        push(&mut pairs, "accountId", self.account.as_deref());
        push(&mut pairs, "symbolId", self.symbol.as_deref());
        push(&mut pairs, "asset", self.asset.as_deref());
        push(&mut pairs, "offset", self.offset);
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("order", self.order.as_str().to_string()));
        push(&mut pairs, "orderId", self.order_id.as_deref());
        push(&mut pairs, "orderPos", self.order_pos);
        push(&mut pairs, "fromDate", self.from.map(|day| day.format("%Y-%m-%d")));
        push(&mut pairs, "toDate", self.to.map(|day| day.format("%Y-%m-%d")));
        if !self.operation_types.is_empty() {
            pairs.push(("operationType", self.operation_types.join(",")));
        }
        pairs
    }
}

/// New parameters of a replaced order. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceParams {
    /// Order quantity.
    pub quantity: Decimal,
    /// Limit, stop-limit and iceberg orders.
    pub limit_price: Option<Decimal>,
    /// Stop and stop-limit orders.
    pub stop_price: Option<Decimal>,
    /// Trailing stop orders.
    pub price_distance: Option<Decimal>,
}

impl ReplaceParams {
    /// Replace the quantity only.
    #[must_use]
    pub fn quantity(quantity: Decimal) -> Self {
        Self {
            quantity,
            ..Self::default()
        }
    }

    /// Set the limit price.
    #[must_use]
    pub const fn with_limit_price(mut self, price: Decimal) -> Self {
        self.limit_price = Some(price);
        self
    }

    /// Set the stop price.
    #[must_use]
    pub const fn with_stop_price(mut self, price: Decimal) -> Self {
        self.stop_price = Some(price);
        self
    }

    /// Set the trailing distance.
    #[must_use]
    pub const fn with_price_distance(mut self, distance: Decimal) -> Self {
        self.price_distance = Some(distance);
        self
    }

    /// Wire `parameters` object, every value as a string.
    pub(crate) fn to_json(&self) -> serde_json::Value {
        let mut parameters = serde_json::Map::new();
        parameters.insert("quantity".into(), self.quantity.to_string().into());
        for (key, value) in [
            ("limitPrice", self.limit_price),
            ("stopPrice", self.stop_price),
            ("priceDistance", self.price_distance),
        ] {
            if let Some(value) = value {
                parameters.insert(key.into(), value.to_string().into());
            }
        }
        serde_json::Value::Object(parameters)
    }
}

/// OHLC candles, shaped by the requested [`DataType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Candles {
    /// Quote-based candles.
    Quotes(Vec<OhlcQuotes>),
    /// Trade-based candles, with volume.
    Trades(Vec<OhlcTrades>),
}

impl Candles {
    /// Number of candles.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Quotes(candles) => candles.len(),
            Self::Trades(candles) => candles.len(),
        }
    }

    /// Whether no candle was returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw ticks, shaped by the requested [`DataType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Ticks {
    /// Quote ticks.
    Quotes(Vec<Quote>),
    /// Trade ticks.
    Trades(Vec<Trade>),
}
