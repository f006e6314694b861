//! Wire models for every API version.
//!
//! Shapes that exist per version are declared as `NameV1`/`NameV2`/`NameV3`
//! structs and gathered into one enum per abstract type. Unversioned shapes
//! are plain structs.

mod account;
mod enums;
mod market;
mod order;
mod reference;

pub use account::{
    CurrencyPosV1, CurrencyPosV3, PositionV1, PositionV3, Summary, SummaryV1, SummaryV2, SummaryV3,
    Transaction, TransactionV1, TransactionV2, TransactionV3, UserAccount,
};
pub use enums::{
    CandleDuration, DataType, Duration, FeedLevel, InstrumentType, ModifyAction, OptionRight,
    OrderStatus, OrderType, Ordering, PermissionStatus, Scope, Side,
};
pub use market::{
    Change, ChangeV1, ChangeV2, ChangeV3, OhlcQuotes, OhlcTrades, PriceLevel, Quote, QuoteV1,
    QuoteV2, QuoteV3, Trade, TradeV1, TradeV2, TradeV3, ValueLevel,
};
pub use order::{
    Execution, ExecutionV1, ExecutionV2, ExecutionV3, Fill, Order, OrderParametersV1,
    OrderParametersV3, OrderRequest, OrderRequestV1, OrderRequestV2, OrderRequestV3, OrderState,
    OrderTicket, OrderV1, OrderV2, OrderV3, Reject,
};
pub use reference::{
    Crossrate, Exchange, Group, Identifiers, Interval, OptionDataV1, OptionDataV3, Period,
    Schedule, Symbol, SymbolSpecification, SymbolV1, SymbolV2, SymbolV3,
};
