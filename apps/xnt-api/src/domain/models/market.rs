//! Market data: quotes, trades, daily change and OHLC candles.

use rust_decimal::Decimal;

use crate::registry::versioned;
use crate::serialization::{Timestamp, wire_model};

// =============================================================================
// Quote
// =============================================================================

wire_model! {
    /// Top-of-book quote, 1.0 shape.
    pub struct QuoteV1 {
        required {
            timestamp: Timestamp,
            symbol_id: String,
            bid: Decimal,
            ask: Decimal,
        }
    }
}

wire_model! {
    /// Order book level with a `value` price.
    pub struct ValueLevel {
        required {
            value: Decimal,
            size: Decimal,
        }
    }
}

wire_model! {
    /// Quote with book levels, 2.0 shape.
    pub struct QuoteV2 {
        required {
            timestamp: Timestamp,
            symbol_id: String,
            bid: Vec<ValueLevel>,
            ask: Vec<ValueLevel>,
        }
        ordered ["bid", "ask"]
    }
}

wire_model! {
    /// Order book level with a `price`.
    pub struct PriceLevel {
        required {
            price: Decimal,
            size: Decimal,
        }
    }
}

wire_model! {
    /// Quote with book levels, 3.0 shape.
    pub struct QuoteV3 {
        required {
            timestamp: Timestamp,
            symbol_id: String,
            bid: Vec<PriceLevel>,
            ask: Vec<PriceLevel>,
        }
        ordered ["bid", "ask"]
    }
}

versioned! {
    /// A bid/ask quote.
    pub enum Quote: Quote {
        V1(QuoteV1),
        V2(QuoteV2),
        V3(QuoteV3),
    }
}

fn midpoint(bid: Option<Decimal>, ask: Option<Decimal>) -> Option<Decimal> {
    bid?.checked_add(ask?)?.checked_div(Decimal::TWO)
}

impl QuoteV1 {
    /// Midpoint of bid and ask.
    #[must_use]
    pub fn mid(&self) -> Option<Decimal> {
        midpoint(self.bid, self.ask)
    }
}

impl QuoteV2 {
    /// Midpoint of the best levels.
    #[must_use]
    pub fn mid(&self) -> Option<Decimal> {
        let best = |side: Option<&Vec<ValueLevel>>| -> Option<Decimal> { side?.first()?.value };
        midpoint(best(self.bid.as_ref()), best(self.ask.as_ref()))
    }
}

impl QuoteV3 {
    /// Midpoint of the best levels.
    #[must_use]
    pub fn mid(&self) -> Option<Decimal> {
        let best = |side: Option<&Vec<PriceLevel>>| -> Option<Decimal> { side?.first()?.price };
        midpoint(best(self.bid.as_ref()), best(self.ask.as_ref()))
    }
}

impl Quote {
    /// Midpoint of the top of book, when both sides are present.
    #[must_use]
    pub fn mid(&self) -> Option<Decimal> {
        match self {
            Self::V1(quote) => quote.mid(),
            Self::V2(quote) => quote.mid(),
            Self::V3(quote) => quote.mid(),
        }
    }

    /// Quoted instrument.
    #[must_use]
    pub fn symbol_id(&self) -> Option<&str> {
        match self {
            Self::V1(quote) => quote.symbol_id.as_deref(),
            Self::V2(quote) => quote.symbol_id.as_deref(),
            Self::V3(quote) => quote.symbol_id.as_deref(),
        }
    }
}

// =============================================================================
// Trade
// =============================================================================

wire_model! {
    /// Market trade, 1.0 and 2.0 shape.
    pub struct TradeV1 {
        required {
            timestamp: Timestamp,
            symbol_id: String,
            value: Decimal,
            size: Decimal,
        }
    }
}

/// The 2.0 trade is unchanged from 1.0.
pub type TradeV2 = TradeV1;

wire_model! {
    /// Market trade, 3.0 shape.
    pub struct TradeV3 {
        required {
            timestamp: Timestamp,
            symbol_id: String,
            price: Decimal,
            size: Decimal,
        }
    }
}

versioned! {
    /// A market trade.
    pub enum Trade: Trade {
        V1(TradeV1),
        V2(TradeV2),
        V3(TradeV3),
    }
}

// =============================================================================
// Daily change
// =============================================================================

wire_model! {
    /// Daily change, 1.0 and 2.0 shape.
    pub struct ChangeV1 {
        required {
            base_price: Decimal,
            daily_change: Decimal,
            symbol_id: String,
        }
    }
}

/// The 2.0 change is unchanged from 1.0.
pub type ChangeV2 = ChangeV1;

wire_model! {
    /// Daily change, 3.0 shape.
    pub struct ChangeV3 {
        required {
            last_session_close_price: Decimal,
            daily_change: Decimal,
            symbol_id: String,
        }
    }
}

versioned! {
    /// Daily price change of an instrument.
    pub enum Change: Change {
        V1(ChangeV1),
        V2(ChangeV2),
        V3(ChangeV3),
    }
}

// =============================================================================
// Candles
// =============================================================================

wire_model! {
    /// Quote-based candle.
    pub struct OhlcQuotes {
        required {
            open: Decimal,
            low: Decimal,
            high: Decimal,
            close: Decimal,
            timestamp: Timestamp,
        }
    }
}

wire_model! {
    /// Trade-based candle.
    pub struct OhlcTrades {
        required {
            open: Decimal,
            low: Decimal,
            high: Decimal,
            close: Decimal,
            timestamp: Timestamp,
            volume: Decimal,
        }
    }
}
