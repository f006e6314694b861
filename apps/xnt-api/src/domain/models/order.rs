//! Orders: placement requests, server-side orders, fills and executions.

use rust_decimal::Decimal;

use super::enums::{Duration, OrderStatus, OrderType, Side};
use crate::domain::ApiVersion;
use crate::registry::versioned;
use crate::serialization::{Timestamp, wire_model};

// =============================================================================
// Placement request
// =============================================================================

wire_model! {
    /// Order placement request, 1.0 shape.
    pub struct OrderRequestV1 {
        required {
            account: String,
            instrument: String,
            side: Side,
            quantity: Decimal,
            duration: Duration,
            order_type: OrderType,
        }
        optional {
            client_tag: String,
            oco_group: String,
            if_done_parent_id: String,
            limit_price: Decimal,
            stop_price: Decimal,
            price_distance: Decimal,
            part_quantity: Decimal,
            place_interval: Decimal,
        }
    }
}

wire_model! {
    /// Order placement request, 2.0 shape.
    pub struct OrderRequestV2 {
        required {
            account_id: String,
            instrument: String,
            side: Side,
            quantity: Decimal,
            duration: Duration,
            order_type: OrderType,
        }
        optional {
            client_tag: String,
            oco_group: String,
            if_done_parent_id: String,
            take_profit: Decimal,
            stop_loss: Decimal,
            limit_price: Decimal,
            stop_price: Decimal,
            price_distance: Decimal,
            part_quantity: Decimal,
            place_interval: Decimal,
        }
    }
}

wire_model! {
    /// Order placement request, 3.0 shape.
    pub struct OrderRequestV3 {
        required {
            account_id: String,
            symbol_id: String,
            side: Side,
            quantity: Decimal,
            duration: Duration,
            order_type: OrderType,
        }
        optional {
            client_tag: String,
            oco_group: String,
            if_done_parent_id: String,
            take_profit: Decimal,
            stop_loss: Decimal,
            limit_price: Decimal,
            stop_price: Decimal,
            price_distance: Decimal,
            part_quantity: Decimal,
            place_interval: Decimal,
        }
    }
}

versioned! {
    /// An order to be placed.
    pub enum OrderRequest: OrderRequest {
        V1(OrderRequestV1),
        V2(OrderRequestV2),
        V3(OrderRequestV3),
    }
}

/// Parameters shared by every order type.
///
/// `take_profit` and `stop_loss` have no 1.0 representation and are dropped
/// when building a 1.0 request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTicket {
    /// Account placing the order.
    pub account: String,
    /// Instrument identifier.
    pub symbol_id: String,
    /// Buy or sell.
    pub side: Side,
    /// Order size.
    pub quantity: Decimal,
    /// Time in force.
    pub duration: Duration,
    /// Caller reference.
    pub client_tag: Option<String>,
    /// One-cancels-other group.
    pub oco_group: Option<String>,
    /// Parent order this one is attached to.
    pub if_done_parent_id: Option<String>,
    /// Take-profit price.
    pub take_profit: Option<Decimal>,
    /// Stop-loss price.
    pub stop_loss: Option<Decimal>,
}

impl OrderTicket {
    /// Ticket with no optional parameters.
    pub fn new(
        account: impl Into<String>,
        symbol_id: impl Into<String>,
        side: Side,
        quantity: Decimal,
        duration: Duration,
    ) -> Self {
        Self {
            account: account.into(),
            symbol_id: symbol_id.into(),
            side,
            quantity,
            duration,
            client_tag: None,
            oco_group: None,
            if_done_parent_id: None,
            take_profit: None,
            stop_loss: None,
        }
    }

    /// Set the caller reference.
    #[must_use]
    pub fn with_client_tag(mut self, tag: impl Into<String>) -> Self {
        self.client_tag = Some(tag.into());
        self
    }

    /// Put the order in a one-cancels-other group.
    #[must_use]
    pub fn with_oco_group(mut self, group: impl Into<String>) -> Self {
        self.oco_group = Some(group.into());
        self
    }

    /// Attach to a parent order.
    #[must_use]
    pub fn with_if_done_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.if_done_parent_id = Some(parent_id.into());
        self
    }

    /// Set take-profit and stop-loss prices.
    #[must_use]
    pub fn with_brackets(mut self, take_profit: Option<Decimal>, stop_loss: Option<Decimal>) -> Self {
        self.take_profit = take_profit;
        self.stop_loss = stop_loss;
        self
    }
}

/// Type-specific prices of a request.
#[derive(Debug, Default)]
struct Pricing {
    limit_price: Option<Decimal>,
    stop_price: Option<Decimal>,
    price_distance: Option<Decimal>,
    part_quantity: Option<Decimal>,
    place_interval: Option<Decimal>,
}

impl OrderRequest {
    fn build(version: ApiVersion, ticket: OrderTicket, order_type: OrderType, pricing: Pricing) -> Self {
        match version {
            ApiVersion::V1 => Self::V1(OrderRequestV1 {
                account: Some(ticket.account),
                instrument: Some(ticket.symbol_id),
                side: Some(ticket.side),
                quantity: Some(ticket.quantity),
                duration: Some(ticket.duration),
                order_type: Some(order_type),
                client_tag: ticket.client_tag,
                oco_group: ticket.oco_group,
                if_done_parent_id: ticket.if_done_parent_id,
                limit_price: pricing.limit_price,
                stop_price: pricing.stop_price,
                price_distance: pricing.price_distance,
                part_quantity: pricing.part_quantity,
                place_interval: pricing.place_interval,
            }),
            ApiVersion::V2 => Self::V2(OrderRequestV2 {
                account_id: Some(ticket.account),
                instrument: Some(ticket.symbol_id),
                side: Some(ticket.side),
                quantity: Some(ticket.quantity),
                duration: Some(ticket.duration),
                order_type: Some(order_type),
                client_tag: ticket.client_tag,
                oco_group: ticket.oco_group,
                if_done_parent_id: ticket.if_done_parent_id,
                take_profit: ticket.take_profit,
                stop_loss: ticket.stop_loss,
                limit_price: pricing.limit_price,
                stop_price: pricing.stop_price,
                price_distance: pricing.price_distance,
                part_quantity: pricing.part_quantity,
                place_interval: pricing.place_interval,
            }),
            ApiVersion::V3 => Self::V3(OrderRequestV3 {
                account_id: Some(ticket.account),
                symbol_id: Some(ticket.symbol_id),
                side: Some(ticket.side),
                quantity: Some(ticket.quantity),
                duration: Some(ticket.duration),
                order_type: Some(order_type),
                client_tag: ticket.client_tag,
                oco_group: ticket.oco_group,
                if_done_parent_id: ticket.if_done_parent_id,
                take_profit: ticket.take_profit,
                stop_loss: ticket.stop_loss,
                limit_price: pricing.limit_price,
                stop_price: pricing.stop_price,
                price_distance: pricing.price_distance,
                part_quantity: pricing.part_quantity,
                place_interval: pricing.place_interval,
            }),
        }
    }

    /// Market order.
    #[must_use]
    pub fn market(version: ApiVersion, ticket: OrderTicket) -> Self {
        Self::build(version, ticket, OrderType::Market, Pricing::default())
    }

    /// Limit order.
    #[must_use]
    pub fn limit(version: ApiVersion, ticket: OrderTicket, limit_price: Decimal) -> Self {
        let pricing = Pricing {
            limit_price: Some(limit_price),
            ..Pricing::default()
        };
        Self::build(version, ticket, OrderType::Limit, pricing)
    }

    /// Stop order.
    #[must_use]
    pub fn stop(version: ApiVersion, ticket: OrderTicket, stop_price: Decimal) -> Self {
        let pricing = Pricing {
            stop_price: Some(stop_price),
            ..Pricing::default()
        };
        Self::build(version, ticket, OrderType::Stop, pricing)
    }

    /// Stop-limit order.
    #[must_use]
    pub fn stop_limit(
        version: ApiVersion,
        ticket: OrderTicket,
        limit_price: Decimal,
        stop_price: Decimal,
    ) -> Self {
        let pricing = Pricing {
            limit_price: Some(limit_price),
            stop_price: Some(stop_price),
            ..Pricing::default()
        };
        Self::build(version, ticket, OrderType::StopLimit, pricing)
    }

    /// Trailing stop at `price_distance` from the market.
    #[must_use]
    pub fn trailing_stop(version: ApiVersion, ticket: OrderTicket, price_distance: Decimal) -> Self {
        let pricing = Pricing {
            price_distance: Some(price_distance),
            ..Pricing::default()
        };
        Self::build(version, ticket, OrderType::TrailingStop, pricing)
    }

    /// TWAP order sending `part_quantity` every `place_interval` seconds.
    #[must_use]
    pub fn twap(
        version: ApiVersion,
        ticket: OrderTicket,
        part_quantity: Decimal,
        place_interval: Decimal,
    ) -> Self {
        let pricing = Pricing {
            part_quantity: Some(part_quantity),
            place_interval: Some(place_interval),
            ..Pricing::default()
        };
        Self::build(version, ticket, OrderType::Twap, pricing)
    }

    /// Iceberg order showing `part_quantity` at `limit_price`.
    #[must_use]
    pub fn iceberg(
        version: ApiVersion,
        ticket: OrderTicket,
        part_quantity: Decimal,
        limit_price: Decimal,
    ) -> Self {
        let pricing = Pricing {
            part_quantity: Some(part_quantity),
            limit_price: Some(limit_price),
            ..Pricing::default()
        };
        Self::build(version, ticket, OrderType::Iceberg, pricing)
    }

    /// Account placing the order.
    #[must_use]
    pub fn account(&self) -> Option<&str> {
        match self {
            Self::V1(request) => request.account.as_deref(),
            Self::V2(request) => request.account_id.as_deref(),
            Self::V3(request) => request.account_id.as_deref(),
        }
    }

    /// Order type.
    #[must_use]
    pub const fn order_type(&self) -> Option<OrderType> {
        match self {
            Self::V1(request) => request.order_type,
            Self::V2(request) => request.order_type,
            Self::V3(request) => request.order_type,
        }
    }
}

// =============================================================================
// Server-side order
// =============================================================================

wire_model! {
    /// One fill of an order.
    pub struct Fill {
        required {
            quantity: Decimal,
            price: Decimal,
            position: i64,
            time: Timestamp,
        }
    }
}

wire_model! {
    /// Current state of an order.
    pub struct OrderState {
        required {
            last_update: Timestamp,
            status: OrderStatus,
            fills: Vec<Fill>,
        }
        optional {
            reason: String,
        }
    }
}

wire_model! {
    /// Business rejection returned instead of an order.
    pub struct Reject {
        required {
            group: String,
            message: String,
        }
    }
}

wire_model! {
    /// Order parameters, 1.0 and 2.0 shape.
    pub struct OrderParametersV1 {
        required {
            side: Side,
            duration: Duration,
            quantity: Decimal,
            instrument: String,
            order_type: OrderType,
        }
        optional {
            oco_group: String,
            if_done_parent_id: String,
            limit_price: Decimal,
            stop_price: Decimal,
            price_distance: Decimal,
            part_quantity: Decimal,
            place_interval: Decimal,
        }
    }
}

wire_model! {
    /// Order parameters, 3.0 shape.
    pub struct OrderParametersV3 {
        required {
            side: Side,
            duration: Duration,
            quantity: Decimal,
            symbol_id: String,
            order_type: OrderType,
        }
        optional {
            oco_group: String,
            if_done_parent_id: String,
            limit_price: Decimal,
            stop_price: Decimal,
            price_distance: Decimal,
            part_quantity: Decimal,
            place_interval: Decimal,
        }
    }
}

wire_model! {
    /// Order, 1.0 shape.
    pub struct OrderV1 {
        required {
            place_time: Timestamp,
            order_state: OrderState,
            id: String,
            order_parameters: OrderParametersV1,
            current_modification_id: String,
            exante_account: String,
        }
        optional {
            client_tag: String,
            username: String,
        }
    }
}

wire_model! {
    /// Order, 2.0 shape.
    pub struct OrderV2 {
        required {
            place_time: Timestamp,
            order_state: OrderState,
            id: String,
            order_parameters: OrderParametersV1,
            username: String,
            current_modification_id: String,
        }
        optional {
            account_id: String,
            client_tag: String,
        }
    }
}

wire_model! {
    /// Order, 3.0 shape.
    pub struct OrderV3 {
        required {
            place_time: Timestamp,
            order_state: OrderState,
            order_id: String,
            order_parameters: OrderParametersV3,
            username: String,
            current_modification_id: String,
            account_id: String,
        }
        optional {
            client_tag: String,
        }
    }
}

versioned! {
    /// An order known to the server.
    pub enum Order: Order {
        V1(OrderV1),
        V2(OrderV2),
        V3(OrderV3),
    }
}

impl Order {
    /// Server-assigned order id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::V1(order) => order.id.as_deref(),
            Self::V2(order) => order.id.as_deref(),
            Self::V3(order) => order.order_id.as_deref(),
        }
    }

    /// Account the order belongs to.
    #[must_use]
    pub fn account(&self) -> Option<&str> {
        match self {
            Self::V1(order) => order.exante_account.as_deref(),
            Self::V2(order) => order.account_id.as_deref(),
            Self::V3(order) => order.account_id.as_deref(),
        }
    }

    /// Order state.
    #[must_use]
    pub const fn state(&self) -> Option<&OrderState> {
        match self {
            Self::V1(order) => order.order_state.as_ref(),
            Self::V2(order) => order.order_state.as_ref(),
            Self::V3(order) => order.order_state.as_ref(),
        }
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> Option<OrderStatus> {
        self.state()?.status
    }

    /// Instrument the order trades.
    #[must_use]
    pub fn symbol_id(&self) -> Option<&str> {
        match self {
            Self::V1(order) => order.order_parameters.as_ref()?.instrument.as_deref(),
            Self::V2(order) => order.order_parameters.as_ref()?.instrument.as_deref(),
            Self::V3(order) => order.order_parameters.as_ref()?.symbol_id.as_deref(),
        }
    }
}

// =============================================================================
// Execution
// =============================================================================

wire_model! {
    /// Execution report, 1.0 and 2.0 shape.
    pub struct ExecutionV1 {
        required {
            quantity: Decimal,
            order_id: String,
            event: String,
            price: Decimal,
            position: Decimal,
            time: Timestamp,
        }
    }
}

/// The 2.0 execution is unchanged from 1.0.
pub type ExecutionV2 = ExecutionV1;

wire_model! {
    /// Execution report, 3.0 shape.
    pub struct ExecutionV3 {
        required {
            quantity: Decimal,
            order_id: String,
            price: Decimal,
            position: Decimal,
            timestamp: Timestamp,
        }
    }
}

versioned! {
    /// A fill reported on the executions stream.
    pub enum Execution: Execution {
        V1(ExecutionV1),
        V2(ExecutionV2),
        V3(ExecutionV3),
    }
}

impl Execution {
    /// Order that was filled.
    #[must_use]
    pub fn order_id(&self) -> Option<&str> {
        match self {
            Self::V1(execution) | Self::V2(execution) => execution.order_id.as_deref(),
            Self::V3(execution) => execution.order_id.as_deref(),
        }
    }
}
