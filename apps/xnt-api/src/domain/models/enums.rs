//! Wire enumerations.
//!
//! Every enum decodes from its wire token and also from its symbolic name,
//! and always encodes to the wire token.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Instrument class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    /// Equity.
    #[serde(rename = "STOCK")]
    Stock,
    /// Futures contract.
    #[serde(rename = "FUTURE")]
    Future,
    /// Bond.
    #[serde(rename = "BOND")]
    Bond,
    /// Currency pair, also known as `FOREX`.
    #[serde(rename = "CURRENCY", alias = "FOREX")]
    Currency,
    /// Fund.
    #[serde(rename = "FUND")]
    Fund,
    /// Option contract.
    #[serde(rename = "OPTION")]
    Option,
    /// Contract for difference.
    #[serde(rename = "CFD")]
    Cfd,
    /// Calendar spread.
    #[serde(rename = "CALENDAR_SPREAD")]
    CalendarSpread,
    /// Spot FX.
    #[serde(rename = "FX_SPOT")]
    FxSpot,
}

impl InstrumentType {
    /// Wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "STOCK",
            Self::Future => "FUTURE",
            Self::Bond => "BOND",
            Self::Currency => "CURRENCY",
            Self::Fund => "FUND",
            Self::Option => "OPTION",
            Self::Cfd => "CFD",
            Self::CalendarSpread => "CALENDAR_SPREAD",
            Self::FxSpot => "FX_SPOT",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    /// Valid for the trading day.
    Day,
    /// Valid until cancelled.
    GoodTillCancel,
    /// Valid until a given time.
    GoodTillTime,
    /// Fill what is possible, cancel the rest.
    ImmediateOrCancel,
    /// Fill entirely or cancel.
    FillOrKill,
    /// Execute at the open.
    AtTheOpening,
    /// Execute at the close.
    AtTheClose,
    /// Reported by the server for durations it cannot name.
    Unknown,
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Market order.
    Market,
    /// Limit order.
    Limit,
    /// Stop order.
    Stop,
    /// Stop-limit order.
    StopLimit,
    /// Time-weighted slices.
    Twap,
    /// Iceberg order.
    Iceberg,
    /// Trailing stop.
    TrailingStop,
    /// Reported by the server for types it cannot name.
    Unknown,
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy.
    #[serde(rename = "buy", alias = "BUY")]
    Buy,
    /// Sell.
    #[serde(rename = "sell", alias = "SELL")]
    Sell,
}

/// Account permission level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionStatus {
    /// Trading allowed.
    #[serde(rename = "Full", alias = "full_access")]
    Full,
    /// Read only.
    #[serde(rename = "ReadOnly", alias = "read_only")]
    ReadOnly,
    /// Only position-reducing orders.
    #[serde(rename = "CloseOnly", alias = "close_only")]
    CloseOnly,
}

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionRight {
    /// Put.
    #[serde(rename = "PUT")]
    Put,
    /// Call.
    #[serde(rename = "CALL")]
    Call,
    /// Both rights.
    #[serde(rename = "BOTH")]
    Both,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created locally by the server.
    Created,
    /// Accepted by the server.
    Accepted,
    /// Waiting for a trigger.
    Pending,
    /// Being placed at the venue.
    Placing,
    /// Working at the venue.
    Working,
    /// Cancelled.
    Cancelled,
    /// Completely filled.
    Filled,
    /// Rejected.
    Rejected,
}

impl OrderStatus {
    /// Whether the order can no longer change.
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, Self::Filled | Self::Rejected | Self::Cancelled)
    }

    /// Whether the order may still change.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !self.is_terminated()
    }
}

/// Order modification sent to `/orders/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifyAction {
    /// Replace parameters.
    Replace,
    /// Cancel the order.
    Cancel,
}

/// Depth of a quote feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedLevel {
    /// Top of book.
    #[default]
    BestPrice,
    /// Full depth.
    MarketDepth,
}

impl FeedLevel {
    /// Query token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BestPrice => "best_price",
            Self::MarketDepth => "market_depth",
        }
    }
}

/// Sort direction of historical queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Ordering {
    /// Oldest first.
    #[serde(rename = "ASC")]
    Asc,
    /// Newest first.
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl Ordering {
    /// Query token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Kind of aggregated market data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Quote based.
    #[default]
    Quotes,
    /// Trade based.
    Trades,
}

impl DataType {
    /// Query token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quotes => "quotes",
            Self::Trades => "trades",
        }
    }
}

/// Candle length of an OHLC series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandleDuration {
    /// One minute.
    Min1,
    /// Five minutes.
    Min5,
    /// Thirty minutes.
    Min30,
    /// One hour.
    Hour1,
    /// One day.
    Day1,
}

impl CandleDuration {
    /// Candle length in seconds, as used in the request path.
    #[must_use]
    pub const fn as_secs(self) -> u32 {
        match self {
            Self::Min1 => 60,
            Self::Min5 => 300,
            Self::Min30 => 1800,
            Self::Hour1 => 3600,
            Self::Day1 => 86400,
        }
    }
}

/// JWT audience entry granting access to one API area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Symbol reference data.
    Symbols,
    /// Quote and trade feeds.
    Feed,
    /// Daily change.
    Change,
    /// OHLC and ticks.
    Ohlc,
    /// Currency crossrates.
    Crossrates,
    /// Account summary.
    Summary,
    /// Order management.
    Orders,
    /// Account transactions.
    Transactions,
    /// Account list.
    Accounts,
}

impl Scope {
    /// Every scope.
    pub const ALL: [Self; 9] = [
        Self::Symbols,
        Self::Feed,
        Self::Change,
        Self::Ohlc,
        Self::Crossrates,
        Self::Summary,
        Self::Orders,
        Self::Transactions,
        Self::Accounts,
    ];

    /// Audience token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Symbols => "symbols",
            Self::Feed => "feed",
            Self::Change => "change",
            Self::Ohlc => "ohlc",
            Self::Crossrates => "crossrates",
            Self::Summary => "summary",
            Self::Orders => "orders",
            Self::Transactions => "transactions",
            Self::Accounts => "accounts",
        }
    }

    /// Parse an audience token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scope| scope.as_str() == token)
    }
}
