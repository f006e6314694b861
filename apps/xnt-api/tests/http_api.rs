//! REST Facade Integration Tests
//!
//! Drives `HttpApi` against a `wiremock` server: versioned URLs and shapes,
//! placement outcomes, request bodies, timeouts and retries.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::json;
use test_case::test_case;
use wiremock::matchers::{body_json, header, header_exists, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{End, NdjsonServer, Session, api, order_v2, order_v3};
use xnt_api::application::{Candles, HistoryQuery, ReplaceParams, TransactionsQuery};
use xnt_api::domain::models::{Duration as OrderDuration, Side};
use xnt_api::{
    ApiError, ApiVersion, ClientConfig, DataType, HttpApi, JwtSettings, OrderRequest, OrderTicket,
    Placement, RetryConfig, Summary, TokenSource, TransportError,
};

fn summary_v3() -> serde_json::Value {
    json!({
        "accountId": "ABC1234.001",
        "timestamp": 1_598_625_378_042_i64,
        "currency": "EUR",
        "marginUtilization": "0.1",
        "freeMoney": "9000",
        "netAssetValue": "10503.75",
        "moneyUsedForMargin": "1000",
        "sessionDate": "2020-08-28",
        "currencies": [{"code": "EUR", "price": "1", "convertedValue": "10503.75"}],
        "positions": []
    })
}

#[tokio::test]
async fn user_accounts_are_authenticated_and_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/md/3.0/accounts"))
        .and(header_exists("authorization"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"status": "Full", "accountId": "ABC1234.001"},
            {"status": "ReadOnly", "accountId": "ABC1234.002"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let accounts = api(&server.uri(), ApiVersion::V3).user_accounts(None).await.unwrap();
    let ids: Vec<_> = accounts.iter().filter_map(|a| a.account_id.as_deref()).collect();
    assert_eq!(ids, ["ABC1234.001", "ABC1234.002"]);
}

#[tokio::test]
async fn jwt_client_sends_current_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/md/2.0/accounts"))
        .and(header_regex(
            "authorization",
            r"^Bearer [A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+$",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"status": "Full", "accountId": "ABC1234.001"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let settings = JwtSettings::new("app", "client", "shared-key", Duration::from_secs(3600));
    let config = ClientConfig::jwt(settings)
        .with_url(server.uri())
        .with_version(ApiVersion::V2)
        .with_retry(RetryConfig::none());
    let client = HttpApi::new(config).unwrap();
    let token = client.token_source().unwrap().current();
    assert!(token.is_valid_at(chrono::Utc::now()));

    let accounts = client.user_accounts(None).await.unwrap();
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn version_override_selects_path_and_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/md/3.0/summary/ABC1234.001/EUR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_v3()))
        .mount(&server)
        .await;

    let client = api(&server.uri(), ApiVersion::V2);
    let summary = client
        .account_summary("ABC1234.001", "eur", None, Some(ApiVersion::V3))
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(summary, Summary::V3(_)));
    assert_eq!(summary.account(), Some("ABC1234.001"));
    assert_eq!(summary.net_asset_value(), Some(dec!(10503.75)));
}

#[tokio::test]
async fn strict_client_rejects_foreign_shapes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/md/2.0/summary/ABC1234.001/EUR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_v3()))
        .mount(&server)
        .await;

    let err = api(&server.uri(), ApiVersion::V2)
        .account_summary("ABC1234.001", "EUR", None, None)
        .await
        .unwrap_err();
    let ApiError::Schema(schema) = err else {
        panic!("expected schema error, got {err:?}");
    };
    assert_eq!(schema.model(), Some("SummaryV2"));
}

#[tokio::test]
async fn lenient_client_skips_bad_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trade/3.0/orders/active"))
        .and(query_param("limit", "10"))
        .and(query_param("accountId", "ABC1234.001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            order_v3("1", "working"),
            {"orderId": "2"},
            order_v3("3", "pending")
        ])))
        .mount(&server)
        .await;

    let config = ClientConfig::basic("app", "key")
        .with_url(server.uri())
        .with_version(ApiVersion::V3)
        .with_retry(RetryConfig::none());
    let client = HttpApi::new(config).unwrap();
    let orders = client
        .active_orders(Some("ABC1234.001"), None, 10, None)
        .await
        .unwrap();
    let ids: Vec<_> = orders.iter().filter_map(|o| o.id()).collect();
    assert_eq!(ids, ["1", "3"]);
}

#[tokio::test]
async fn strictness_can_be_chosen_per_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trade/3.0/orders/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            order_v3("1", "working"),
            {"orderId": "2"}
        ])))
        .mount(&server)
        .await;

    let client = api(&server.uri(), ApiVersion::V3);
    assert!(client.is_strict());

    let orders = client
        .with_strict(false)
        .active_orders(None, None, 10, None)
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);

    let err = client.active_orders(None, None, 10, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Schema(_)));
    assert!(client.is_strict());
}

#[tokio::test]
async fn placement_returns_orders() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/trade/2.0/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([order_v2("42", "placing")])))
        .mount(&server)
        .await;

    let ticket = OrderTicket::new("ABC1234.001", "AAPL.NASDAQ", Side::Sell, dec!(5), OrderDuration::GoodTillCancel);
    let request = OrderRequest::market(ApiVersion::V2, ticket);
    let placed = api(&server.uri(), ApiVersion::V3).place_order(&request).await.unwrap();

    assert_eq!(placed.len(), 1);
    assert!(placed[0].is_accepted());
    let order = placed.into_iter().next().and_then(Placement::accepted).unwrap();
    assert_eq!(order.id(), Some("42"));
    assert_eq!(order.version(), ApiVersion::V2);
}

#[tokio::test]
async fn single_1_0_order_is_wrapped_in_a_list() {
    let server = MockServer::start().await;
    let mut order = order_v2("43", "working");
    let object = order.as_object_mut().unwrap();
    object.remove("username");
    object.remove("accountId");
    object.insert("exanteAccount".into(), json!("ABC1234.001"));
    Mock::given(method("POST"))
        .and(path("/trade/1.0/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(order))
        .mount(&server)
        .await;

    let ticket = OrderTicket::new("ABC1234.001", "AAPL.NASDAQ", Side::Buy, dec!(1), OrderDuration::Day);
    let request = OrderRequest::limit(ApiVersion::V1, ticket, dec!(503.75));
    let placed = api(&server.uri(), ApiVersion::V2).place_order(&request).await.unwrap();

    assert_eq!(placed.len(), 1);
    let order = placed.into_iter().next().and_then(Placement::accepted).unwrap();
    assert_eq!(order.account(), Some("ABC1234.001"));
}

#[tokio::test]
async fn business_rejection_is_a_value() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/trade/3.0/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "group": "price", "message": "Limit price is too far from the market"
        })))
        .mount(&server)
        .await;

    let ticket = OrderTicket::new("ABC1234.001", "AAPL.NASDAQ", Side::Buy, dec!(1), OrderDuration::Day);
    let request = OrderRequest::limit(ApiVersion::V3, ticket, dec!(1));
    let placed = api(&server.uri(), ApiVersion::V3).place_order(&request).await.unwrap();

    let reject = placed[0].rejection().unwrap();
    assert_eq!(reject.group.as_deref(), Some("price"));
}

#[tokio::test]
async fn replace_sends_stringified_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/trade/3.0/orders/abc-1"))
        .and(body_json(json!({
            "action": "replace",
            "parameters": {"quantity": "10", "limitPrice": "503.75"}
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(order_v3("abc-1", "working")))
        .expect(1)
        .mount(&server)
        .await;

    let params = ReplaceParams::quantity(dec!(10)).with_limit_price(dec!(503.75));
    let outcome = api(&server.uri(), ApiVersion::V3)
        .replace_order("abc-1", &params, None)
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.is_accepted());
}

#[tokio::test]
async fn cancel_sends_only_the_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/trade/3.0/orders/abc-1"))
        .and(body_json(json!({"action": "cancel"})))
        .respond_with(ResponseTemplate::new(202).set_body_json(order_v3("abc-1", "cancelled")))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = api(&server.uri(), ApiVersion::V3)
        .cancel_order("abc-1", None)
        .await
        .unwrap()
        .unwrap();
    let status = outcome.accepted().and_then(|order| order.status());
    assert!(status.is_some_and(|s| s.is_terminated()));
}

#[tokio::test]
async fn timeouts_are_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/md/3.0/accounts"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(3)
        .mount(&server)
        .await;

    let config = ClientConfig::basic("app", "key")
        .with_url(server.uri())
        .with_version(ApiVersion::V3)
        .with_timeout(Duration::from_millis(200))
        .with_retry(RetryConfig {
            max_attempts: 3,
            interval: Duration::from_millis(10),
            max_elapsed: Duration::from_secs(30),
        });
    let err = HttpApi::new(config).unwrap().user_accounts(None).await.unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(
        err,
        ApiError::Transport(TransportError::MaxRetriesExceeded { attempts: 3 })
    ));
}

fn retrying_api(url: &str) -> HttpApi {
    common::init_tracing();
    let config = ClientConfig::basic("app", "key")
        .with_url(url)
        .with_version(ApiVersion::V3)
        .with_timeout(Duration::from_millis(300))
        .with_retry(RetryConfig {
            max_attempts: 3,
            interval: Duration::from_millis(10),
            max_elapsed: Duration::from_secs(30),
        });
    HttpApi::new(config).unwrap()
}

#[tokio::test]
async fn stalled_bodies_are_retried_then_reported() {
    let partial = Session::new([r#"[{"status": "Full""#], End::Hold);
    let server = NdjsonServer::start(vec![partial.clone(), partial.clone(), partial]).await;

    let err = retrying_api(&server.url()).user_accounts(None).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Transport(TransportError::MaxRetriesExceeded { attempts: 3 })
    ));
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn body_cut_mid_stream_is_retried() {
    let server = NdjsonServer::start(vec![
        Session::new([r#"[{"status": "Full""#], End::Drop),
        Session::new([r#"[{"status": "Full", "accountId": "ABC1234.001"}]"#], End::Finish),
    ])
    .await;

    let accounts = retrying_api(&server.url()).user_accounts(None).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].account_id.as_deref(), Some("ABC1234.001"));
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn non_json_body_yields_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/md/3.0/symbols"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let symbols = api(&server.uri(), ApiVersion::V3).symbols(None).await.unwrap();
    assert!(symbols.is_empty());
}

#[tokio::test]
async fn ohlc_trades_carry_volume() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/md/3.0/ohlc/AAPL.NASDAQ/60"))
        .and(query_param("type", "trades"))
        .and(query_param("size", "60"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"open": "1", "low": "0.5", "high": "2", "close": "1.5",
             "timestamp": 1_598_625_360_000_i64, "volume": "300"}
        ])))
        .mount(&server)
        .await;

    let candles = api(&server.uri(), ApiVersion::V3)
        .ohlc(
            "AAPL.NASDAQ",
            xnt_api::domain::models::CandleDuration::Min1,
            &HistoryQuery::new(DataType::Trades),
            None,
        )
        .await
        .unwrap();
    let Candles::Trades(candles) = candles else {
        panic!("expected trade candles");
    };
    assert_eq!(candles[0].volume, Some(dec!(300)));
}

#[tokio::test]
async fn transactions_send_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/md/3.0/transactions"))
        .and(query_param("accountId", "ABC1234.001"))
        .and(query_param("operationType", "TRADE,COMMISSION"))
        .and(query_param("order", "ASC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "operationType": "TRADE", "id": 101, "asset": "AAPL.NASDAQ",
            "timestamp": 1_598_625_378_042_i64, "sum": "-503.75",
            "accountId": "ABC1234.001", "orderPos": 1
        }])))
        .mount(&server)
        .await;

    let query = TransactionsQuery::default()
        .for_account("ABC1234.001")
        .with_operation_types(["TRADE", "COMMISSION"]);
    let transactions = api(&server.uri(), ApiVersion::V3)
        .transactions(&query, None)
        .await
        .unwrap();
    assert_eq!(transactions.len(), 1);
    assert!(transactions[0].timestamp().is_some());
}

#[test_case(ApiVersion::V1, "/md/1.0/change/AAPL.NASDAQ,MSFT.NASDAQ", json!({"basePrice": "500", "dailyChange": "3.75", "symbolId": "AAPL.NASDAQ"}))]
#[test_case(ApiVersion::V3, "/md/3.0/change/AAPL.NASDAQ,MSFT.NASDAQ", json!({"lastSessionClosePrice": "500", "dailyChange": "3.75", "symbolId": "AAPL.NASDAQ"}))]
#[tokio::test]
async fn changes_follow_version(version: ApiVersion, route: &str, item: serde_json::Value) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([item])))
        .expect(1)
        .mount(&server)
        .await;

    let changes = api(&server.uri(), version)
        .changes(&["AAPL.NASDAQ", "MSFT.NASDAQ"], None)
        .await
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].version(), version);
}
