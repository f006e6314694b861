//! Accounts: permissions, summaries and transactions.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::enums::{InstrumentType, PermissionStatus};
use crate::registry::versioned;
use crate::serialization::{Timestamp, wire_model};

wire_model! {
    /// An account the credentials can reach.
    pub struct UserAccount {
        required {
            status: PermissionStatus,
            account_id: String,
        }
    }
}

// =============================================================================
// Summary
// =============================================================================

wire_model! {
    /// Cash balance in one currency, 1.0 and 2.0 shape.
    pub struct CurrencyPosV1 {
        required {
            code: String,
            value: Decimal,
            converted_value: Decimal,
        }
    }
}

wire_model! {
    /// Cash balance in one currency, 3.0 shape.
    pub struct CurrencyPosV3 {
        required {
            code: String,
            price: Decimal,
            converted_value: Decimal,
        }
    }
}

wire_model! {
    /// Open position, 1.0 and 2.0 shape.
    pub struct PositionV1 {
        required {
            id: String,
            symbol_type: InstrumentType,
            currency: String,
            price: Decimal,
            average_price: Decimal,
            quantity: Decimal,
            value: Decimal,
            converted_value: Decimal,
            pnl: Decimal,
            converted_pnl: Decimal,
        }
    }
}

wire_model! {
    /// Open position, 3.0 shape.
    pub struct PositionV3 {
        required {
            symbol_id: String,
            symbol_type: InstrumentType,
            currency: String,
            price: Decimal,
            average_price: Decimal,
            quantity: Decimal,
            value: Decimal,
            converted_value: Decimal,
            pnl: Decimal,
            converted_pnl: Decimal,
        }
    }
}

wire_model! {
    /// Account summary, 1.0 shape.
    pub struct SummaryV1 {
        required {
            account: String,
            timestamp: Timestamp,
            currency: String,
            margin_utilization: Decimal,
            free_money: Decimal,
            net_asset_value: Decimal,
            money_used_for_margin: Decimal,
            session_date: String,
            currencies: Vec<CurrencyPosV1>,
            positions: Vec<PositionV1>,
        }
    }
}

wire_model! {
    /// Account summary, 2.0 shape. The session date is `[year, month, day]`.
    pub struct SummaryV2 {
        required {
            account: String,
            timestamp: Timestamp,
            currency: String,
            margin_utilization: Decimal,
            free_money: Decimal,
            net_asset_value: Decimal,
            money_used_for_margin: Decimal,
            session_date: Vec<u32>,
            currencies: Vec<CurrencyPosV1>,
            positions: Vec<PositionV1>,
        }
    }
}

wire_model! {
    /// Account summary, 3.0 shape.
    pub struct SummaryV3 {
        required {
            account_id: String,
            timestamp: Timestamp,
            currency: String,
            margin_utilization: Decimal,
            free_money: Decimal,
            net_asset_value: Decimal,
            money_used_for_margin: Decimal,
            session_date: String,
            currencies: Vec<CurrencyPosV3>,
            positions: Vec<PositionV3>,
        }
    }
}

versioned! {
    /// Balances and positions of one account.
    pub enum Summary: Summary {
        V1(SummaryV1),
        V2(SummaryV2),
        V3(SummaryV3),
    }
}

impl SummaryV2 {
    /// The session date as a calendar date.
    #[must_use]
    pub fn session_day(&self) -> Option<NaiveDate> {
        match self.session_date.as_deref()? {
            [year, month, day, ..] => {
                NaiveDate::from_ymd_opt(i32::try_from(*year).ok()?, *month, *day)
            }
            _ => None,
        }
    }
}

impl Summary {
    /// Account the summary belongs to, whatever the version calls it.
    #[must_use]
    pub fn account(&self) -> Option<&str> {
        match self {
            Self::V1(summary) => summary.account.as_deref(),
            Self::V2(summary) => summary.account.as_deref(),
            Self::V3(summary) => summary.account_id.as_deref(),
        }
    }

    /// Net asset value in the summary currency.
    #[must_use]
    pub fn net_asset_value(&self) -> Option<Decimal> {
        match self {
            Self::V1(summary) => summary.net_asset_value,
            Self::V2(summary) => summary.net_asset_value,
            Self::V3(summary) => summary.net_asset_value,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

wire_model! {
    /// Account transaction, 1.0 and 2.0 shape.
    pub struct TransactionV1 {
        required {
            operation_type: String,
            id: i64,
            asset: String,
            when: Timestamp,
            sum: Decimal,
        }
        optional {
            symbol_id: String,
            account_id: String,
            order_id: String,
            order_pos: i64,
            uuid: String,
            value_date: NaiveDate,
        }
    }
}

/// The 2.0 transaction is unchanged from 1.0.
pub type TransactionV2 = TransactionV1;

wire_model! {
    /// Account transaction, 3.0 shape.
    pub struct TransactionV3 {
        required {
            operation_type: String,
            id: i64,
            asset: String,
            timestamp: Timestamp,
            sum: Decimal,
        }
        optional {
            symbol_id: String,
            account_id: String,
            order_id: String,
            order_pos: i64,
            uuid: String,
            value_date: NaiveDate,
        }
    }
}

versioned! {
    /// A cash or position movement on an account.
    pub enum Transaction: Transaction {
        V1(TransactionV1),
        V2(TransactionV2),
        V3(TransactionV3),
    }
}

impl Transaction {
    /// When the transaction happened.
    #[must_use]
    pub const fn timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::V1(tx) | Self::V2(tx) => tx.when,
            Self::V3(tx) => tx.timestamp,
        }
    }
}
