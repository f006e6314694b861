//! Schema Round-Trip Tests
//!
//! Every abstract type at every API version: decode a realistic payload
//! strictly, encode it with unset fields kept, decode again and expect the
//! same instance and the same wire form.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use serde_json::{Value, json};
use test_case::test_case;

use common::{order_v2, order_v3};
use xnt_api::{
    ApiVersion, Change, DateFormat, Execution, ModelRegistry, Order, OrderRequest,
    Quote, Summary, Symbol, Trade, Transaction, Versioned,
};

const AT: &str = "2020-08-28T10:56:09.969Z";

fn round_trip<T: Versioned>(version: ApiVersion, wire: &Value) {
    let registry = ModelRegistry::new().unwrap();
    let name = registry.resolve(T::KIND, version).unwrap().name;

    let decoded = registry
        .decode_one::<T>(wire, version, true)
        .unwrap()
        .unwrap_or_else(|| panic!("{name}: nothing decoded"));
    assert_eq!(decoded.version(), version, "{name}");

    for format in [DateFormat::Iso8601, DateFormat::EpochMillis] {
        let encoded = decoded.encode(true, &format).unwrap();
        let back = registry
            .decode_one::<T>(&encoded, version, true)
            .unwrap()
            .unwrap();
        assert_eq!(back, decoded, "{name} via {format:?}");
        assert_eq!(back.encode(true, &format).unwrap(), encoded, "{name} via {format:?}");
    }
}

// =============================================================================
// Orders
// =============================================================================

fn order_v1() -> Value {
    let mut wire = order_v2("77", "filled");
    let wire_map = wire.as_object_mut().unwrap();
    wire_map.remove("username");
    wire_map.remove("accountId");
    wire_map.insert("exanteAccount".into(), json!("ABC1234.001"));
    wire_map.insert("clientTag".into(), json!("tag-1"));
    wire["orderState"]["fills"] = json!([
        {"quantity": "5", "price": "503.75", "position": 0, "time": AT}
    ]);
    wire
}

#[test_case(ApiVersion::V1, order_v1() ; "1.0")]
#[test_case(ApiVersion::V2, order_v2("42", "working") ; "2.0")]
#[test_case(ApiVersion::V3, order_v3("42", "cancelled") ; "3.0")]
fn orders_round_trip(version: ApiVersion, wire: Value) {
    round_trip::<Order>(version, &wire);
}

#[test_case(ApiVersion::V1, json!({
    "account": "ABC1234.001", "instrument": "AAPL.NASDAQ", "side": "buy",
    "quantity": "10", "duration": "day", "orderType": "limit", "limitPrice": "503.75"
}) ; "1.0")]
#[test_case(ApiVersion::V2, json!({
    "accountId": "ABC1234.001", "instrument": "AAPL.NASDAQ", "side": "sell",
    "quantity": "10", "duration": "good_till_cancel", "orderType": "market",
    "takeProfit": "520", "stopLoss": "490.5", "clientTag": "bracket"
}) ; "2.0")]
#[test_case(ApiVersion::V3, json!({
    "accountId": "ABC1234.001", "symbolId": "AAPL.NASDAQ", "side": "buy",
    "quantity": "100", "duration": "day", "orderType": "twap",
    "partQuantity": "10", "placeInterval": "30"
}) ; "3.0")]
fn order_requests_round_trip(version: ApiVersion, wire: Value) {
    round_trip::<OrderRequest>(version, &wire);
}

#[test_case(ApiVersion::V1, json!({
    "quantity": "5", "orderId": "42", "event": "fill", "price": "503.75",
    "position": "5", "time": AT
}) ; "1.0")]
#[test_case(ApiVersion::V2, json!({
    "quantity": "-3", "orderId": "43", "event": "fill", "price": "1.19105",
    "position": "-3", "time": 1_598_612_169_969_i64
}) ; "2.0")]
#[test_case(ApiVersion::V3, json!({
    "quantity": "5", "orderId": "42", "price": "503.75", "position": "5", "timestamp": AT
}) ; "3.0")]
fn executions_round_trip(version: ApiVersion, wire: Value) {
    round_trip::<Execution>(version, &wire);
}

// =============================================================================
// Reference data
// =============================================================================

fn symbol_v1() -> Value {
    json!({
        "name": "Apple", "description": "Apple Inc.", "country": "US",
        "exchange": "NASDAQ", "id": "AAPL.NASDAQ", "currency": "USD",
        "mpi": "0.01", "type": "STOCK", "ticker": "AAPL", "group": null
    })
}

fn symbol_v2() -> Value {
    json!({
        "name": "Apple call", "description": "AAPL 2020-12 150 C", "country": "US",
        "exchange": "CBOE", "id": "AAPL.CBOE.18D2020.C150", "currency": "USD",
        "mpi": "0.01", "type": "OPTION", "ticker": "AAPL", "group": "AAPL.CBOE",
        "optionData": {"optionGroupId": "AAPL.CBOE.18D2020.C*", "right": "CALL", "strikePrice": "150"},
        "expiration": "2020-12-18T21:00:00.000Z",
        "identifiers": {"isin": "US0378331005"}
    })
}

fn symbol_v3() -> Value {
    json!({
        "name": "Euro vs Dollar", "description": "EUR/USD", "country": "",
        "exchange": "EXANTE", "symbolId": "EUR/USD.E.FX", "currency": "USD",
        "minPriceIncrement": "0.00001", "symbolType": "FOREX", "ticker": "EUR/USD",
        "group": "EUR/USD", "underlyingSymbolId": "EUR/USD.E.FX", "icon": "fx"
    })
}

#[test_case(ApiVersion::V1, symbol_v1() ; "1.0")]
#[test_case(ApiVersion::V2, symbol_v2() ; "2.0")]
#[test_case(ApiVersion::V3, symbol_v3() ; "3.0")]
fn symbols_round_trip(version: ApiVersion, wire: Value) {
    round_trip::<Symbol>(version, &wire);
}

// =============================================================================
// Market data
// =============================================================================

#[test_case(ApiVersion::V1, json!({
    "timestamp": AT, "symbolId": "EUR/USD.E.FX", "bid": "1.19105", "ask": "1.19115"
}) ; "1.0")]
#[test_case(ApiVersion::V2, json!({
    "timestamp": AT, "symbolId": "EUR/USD.E.FX",
    "bid": [{"value": "1.19105", "size": "1000000"}, {"value": "1.19100", "size": "500000"}],
    "ask": [{"value": "1.19115", "size": "250000"}]
}) ; "2.0")]
#[test_case(ApiVersion::V3, json!({
    "timestamp": 1_598_612_169_969_i64, "symbolId": "AAPL.NASDAQ",
    "bid": [{"price": "503.70", "size": "100"}],
    "ask": [{"price": "503.80", "size": "200"}, {"price": "503.85", "size": "50"}]
}) ; "3.0")]
fn quotes_round_trip(version: ApiVersion, wire: Value) {
    round_trip::<Quote>(version, &wire);
}

#[test_case(ApiVersion::V1, json!({
    "timestamp": AT, "symbolId": "AAPL.NASDAQ", "value": "503.75", "size": "10"
}) ; "1.0")]
#[test_case(ApiVersion::V2, json!({
    "timestamp": 1_598_612_169_i64, "symbolId": "ES.CME.U2020", "value": "3480.25", "size": "2"
}) ; "2.0")]
#[test_case(ApiVersion::V3, json!({
    "timestamp": AT, "symbolId": "AAPL.NASDAQ", "price": "503.75", "size": "0.5"
}) ; "3.0")]
fn trades_round_trip(version: ApiVersion, wire: Value) {
    round_trip::<Trade>(version, &wire);
}

#[test_case(ApiVersion::V1, json!({
    "basePrice": "499.23", "dailyChange": "4.52", "symbolId": "AAPL.NASDAQ"
}) ; "1.0")]
#[test_case(ApiVersion::V2, json!({
    "basePrice": "1.1925", "dailyChange": "-0.0014", "symbolId": "EUR/USD.E.FX"
}) ; "2.0")]
#[test_case(ApiVersion::V3, json!({
    "lastSessionClosePrice": "499.23", "dailyChange": "4.52", "symbolId": "AAPL.NASDAQ"
}) ; "3.0")]
fn changes_round_trip(version: ApiVersion, wire: Value) {
    round_trip::<Change>(version, &wire);
}

// =============================================================================
// Accounts
// =============================================================================

fn summary(version: ApiVersion) -> Value {
    let (account_key, session_date, currency, mut position) = match version {
        ApiVersion::V1 | ApiVersion::V2 => (
            "account",
            if version == ApiVersion::V1 { json!("2020-08-28") } else { json!([2020, 8, 28]) },
            json!({"code": "USD", "value": "1200.5", "convertedValue": "1012.3"}),
            json!({"id": "AAPL.NASDAQ"}),
        ),
        ApiVersion::V3 => (
            "accountId",
            json!("2020-08-28"),
            json!({"code": "USD", "price": "0.8432", "convertedValue": "1012.3"}),
            json!({"symbolId": "AAPL.NASDAQ"}),
        ),
    };
    let details = json!({
        "symbolType": "STOCK", "currency": "USD", "price": "503.75",
        "averagePrice": "480.10", "quantity": "10", "value": "5037.5",
        "convertedValue": "4247.62", "pnl": "236.5", "convertedPnl": "199.42"
    });
    for (key, value) in details.as_object().unwrap() {
        position[key] = value.clone();
    }

    let mut wire = json!({
        "timestamp": AT,
        "currency": "EUR",
        "marginUtilization": "0.12",
        "freeMoney": "9000",
        "netAssetValue": "10503.75",
        "moneyUsedForMargin": "1000",
        "sessionDate": session_date,
        "currencies": [currency],
        "positions": [position]
    });
    wire[account_key] = json!("ABC1234.001");
    wire
}

#[test_case(ApiVersion::V1 ; "1.0")]
#[test_case(ApiVersion::V2 ; "2.0")]
#[test_case(ApiVersion::V3 ; "3.0")]
fn summaries_round_trip(version: ApiVersion) {
    round_trip::<Summary>(version, &summary(version));
}

#[test_case(ApiVersion::V1, json!({
    "operationType": "TRADE", "id": 190_452_153_i64, "asset": "AAPL.NASDAQ",
    "when": AT, "sum": "10", "symbolId": "AAPL.NASDAQ", "accountId": "ABC1234.001",
    "orderId": "42", "orderPos": 1
}) ; "1.0")]
#[test_case(ApiVersion::V2, json!({
    "operationType": "COMMISSION", "id": 190_452_154_i64, "asset": "USD",
    "when": 1_598_612_169_969_i64, "sum": "-1.5", "uuid": "7f1c3f3e-95b8-4a7e-9f43-2d5bd4f2c0a1",
    "valueDate": "2020-08-28"
}) ; "2.0")]
#[test_case(ApiVersion::V3, json!({
    "operationType": "FUNDING/WITHDRAWAL", "id": 190_452_155_i64, "asset": "EUR",
    "timestamp": AT, "sum": "10000", "accountId": "ABC1234.001"
}) ; "3.0")]
fn transactions_round_trip(version: ApiVersion, wire: Value) {
    round_trip::<Transaction>(version, &wire);
}
