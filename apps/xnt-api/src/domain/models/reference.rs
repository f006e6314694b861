//! Reference data: instruments, exchanges, groups and schedules.

use rust_decimal::Decimal;

use super::enums::{InstrumentType, OptionRight};
use crate::registry::versioned;
use crate::serialization::{Timestamp, wire_model};

wire_model! {
    /// External instrument identifiers.
    pub struct Identifiers {
        required {}
        optional {
            isin: String,
            figi: String,
            cusip: String,
            ric: String,
            sedol: String,
        }
    }
}

// =============================================================================
// Symbol
// =============================================================================

wire_model! {
    /// Option terms, 1.0 and 2.0 shape.
    pub struct OptionDataV1 {
        required {
            option_group_id: String,
            right: OptionRight,
            strike_price: Decimal,
        }
    }
}

wire_model! {
    /// Option terms, 3.0 shape.
    pub struct OptionDataV3 {
        required {
            option_group_id: String,
            option_right: OptionRight,
            strike_price: Decimal,
        }
    }
}

wire_model! {
    /// Instrument definition, 1.0 shape.
    pub struct SymbolV1 {
        required {
            name: String,
            description: String,
            country: String,
            exchange: String,
            id: String,
            currency: String,
            mpi: Decimal,
            type_: InstrumentType,
            ticker: String,
        }
        optional {
            group: String,
            option_data: OptionDataV1,
            expiration: Timestamp,
        }
    }
}

wire_model! {
    /// Instrument definition, 2.0 shape.
    pub struct SymbolV2 {
        required {
            name: String,
            description: String,
            country: String,
            exchange: String,
            id: String,
            currency: String,
            mpi: Decimal,
            type_: InstrumentType,
            ticker: String,
        }
        optional {
            group: String,
            option_data: OptionDataV1,
            expiration: Timestamp,
            identifiers: Identifiers,
        }
    }
}

wire_model! {
    /// Instrument definition, 3.0 shape.
    pub struct SymbolV3 {
        required {
            name: String,
            description: String,
            country: String,
            exchange: String,
            symbol_id: String,
            currency: String,
            min_price_increment: Decimal,
            symbol_type: InstrumentType,
            ticker: String,
            group: String,
        }
        optional {
            expiration: Timestamp,
            option_data: OptionDataV3,
            underlying_symbol_id: String,
            identifiers: Identifiers,
            icon: String,
        }
    }
}

versioned! {
    /// A tradable instrument.
    pub enum Symbol: Symbol {
        V1(SymbolV1),
        V2(SymbolV2),
        V3(SymbolV3),
    }
}

impl Symbol {
    /// Instrument identifier, e.g. `AAPL.NASDAQ`.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::V1(symbol) => symbol.id.as_deref(),
            Self::V2(symbol) => symbol.id.as_deref(),
            Self::V3(symbol) => symbol.symbol_id.as_deref(),
        }
    }

    /// Instrument class.
    #[must_use]
    pub const fn instrument_type(&self) -> Option<InstrumentType> {
        match self {
            Self::V1(symbol) => symbol.type_,
            Self::V2(symbol) => symbol.type_,
            Self::V3(symbol) => symbol.symbol_type,
        }
    }
}

wire_model! {
    /// Trading terms of an instrument.
    pub struct SymbolSpecification {
        required {
            leverage: Decimal,
            contract_multiplier: Decimal,
            price_unit: Decimal,
            units: String,
            lot_size: Decimal,
        }
    }
}

// =============================================================================
// Exchanges, groups, rates
// =============================================================================

wire_model! {
    /// Conversion rate between two currencies.
    pub struct Crossrate {
        required {
            pair: String,
            symbol_id: String,
            rate: Decimal,
        }
    }
}

wire_model! {
    /// A trading venue.
    pub struct Exchange {
        required {
            id: String,
            name: String,
            country: String,
        }
    }
}

wire_model! {
    /// A family of related instruments, e.g. one futures root.
    pub struct Group {
        required {
            group: String,
            name: String,
            types: Vec<InstrumentType>,
            exchange: String,
        }
    }
}

// =============================================================================
// Schedule
// =============================================================================

wire_model! {
    /// Bounds of a trading interval.
    pub struct Period {
        required {
            start: Timestamp,
            end: Timestamp,
        }
    }
}

wire_model! {
    /// A named trading interval.
    pub struct Interval {
        required {
            name: String,
            period: Period,
        }
    }
}

impl Interval {
    /// Interval start.
    #[must_use]
    pub fn start(&self) -> Option<Timestamp> {
        self.period.as_ref()?.start
    }

    /// Interval end.
    #[must_use]
    pub fn end(&self) -> Option<Timestamp> {
        self.period.as_ref()?.end
    }
}

wire_model! {
    /// Trading sessions of an instrument.
    pub struct Schedule {
        required {
            intervals: Vec<Interval>,
        }
    }
}
