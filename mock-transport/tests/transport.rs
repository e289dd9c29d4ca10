//! Integration tests for `MockTransport`: lookup by method, host, path and
//! query set, response shaping, and registry isolation.

use courier_core::{EmptyResponse, NetworkError, RequestDescriptor, RequestMapper, Transport};
use mock_transport::{MockExchange, MockRegistry, MockResponse, MockTransport};
use serde_json::Value;

const HOST: &str = "api.example.com";

async fn transport_with(exchanges: Vec<MockExchange>) -> MockTransport {
    let registry = MockRegistry::new();
    registry.add_all(exchanges).await;
    MockTransport::new(registry)
}

// --- lookup ---

#[tokio::test]
async fn empty_registry_reports_missing_exchange() {
    let transport = MockTransport::default();
    let req = RequestMapper::map(&RequestDescriptor::<Value>::get(HOST, ["items"])).unwrap();

    let err = transport.send(&req).await.unwrap_err();
    assert!(matches!(err, NetworkError::MissingExchange { .. }));
    assert!(err.is_mock_miss());
}

#[tokio::test]
async fn returns_registered_body_and_status() {
    let desc = RequestDescriptor::<Value>::post(HOST, ["items"])
        .json_body(serde_json::json!({"name": "widget"}));
    let transport = transport_with(vec![MockExchange::for_descriptor(
        &desc,
        MockResponse::new(201).with_body(r#"{"name":"widget"}"#),
    )
    .unwrap()])
    .await;

    let req = RequestMapper::map(&desc).unwrap();
    let resp = transport.send(&req).await.unwrap();
    assert_eq!(resp.meta.status, 201);
    assert_eq!(resp.body, br#"{"name":"widget"}"#);
}

#[tokio::test]
async fn query_order_does_not_affect_lookup() {
    let registered = RequestDescriptor::<Value>::get(HOST, ["items"])
        .query("done", true)
        .query("page", 2);
    let transport = transport_with(vec![MockExchange::for_descriptor(
        &registered,
        MockResponse::new(200).with_body("[]"),
    )
    .unwrap()])
    .await;

    let mut req = RequestMapper::map(&registered).unwrap();
    req.query_items.reverse();
    assert_eq!(transport.send(&req).await.unwrap().meta.status, 200);
}

#[tokio::test]
async fn different_query_value_is_a_miss() {
    let registered = RequestDescriptor::<Value>::get(HOST, ["items"]).query("page", 1);
    let transport = transport_with(vec![MockExchange::for_descriptor(
        &registered,
        MockResponse::new(200).with_body("[]"),
    )
    .unwrap()])
    .await;

    let req = RequestMapper::map(&RequestDescriptor::<Value>::get(HOST, ["items"]).query("page", 2))
        .unwrap();
    let err = transport.send(&req).await.unwrap_err();
    assert!(matches!(err, NetworkError::MissingExchange { .. }));
}

// --- response shape ---

#[tokio::test]
async fn impossible_status_reports_missing_response() {
    let desc = RequestDescriptor::<EmptyResponse>::get(HOST, ["broken"]);
    let transport =
        transport_with(vec![MockExchange::for_descriptor(&desc, MockResponse::new(42)).unwrap()])
            .await;

    let err = transport.send(&RequestMapper::map(&desc).unwrap()).await.unwrap_err();
    assert!(matches!(err, NetworkError::MissingResponse { .. }));
}

#[tokio::test]
async fn registered_error_fails_the_send() {
    let desc = RequestDescriptor::<EmptyResponse>::get(HOST, ["offline"]);
    let transport = transport_with(vec![MockExchange::for_descriptor(
        &desc,
        MockResponse::failing("network unreachable"),
    )
    .unwrap()])
    .await;

    let err = transport.send(&RequestMapper::map(&desc).unwrap()).await.unwrap_err();
    assert!(matches!(err, NetworkError::Transport(_)));
}

#[tokio::test]
async fn response_headers_echo_the_pattern() {
    let desc = RequestDescriptor::<EmptyResponse>::delete(HOST, ["items", "1"])
        .header("X-Request-Id", "r-1");
    let transport =
        transport_with(vec![MockExchange::for_descriptor(&desc, MockResponse::new(204)).unwrap()])
            .await;

    let resp = transport.send(&RequestMapper::map(&desc).unwrap()).await.unwrap();
    assert_eq!(resp.meta.headers.get("X-Request-Id").map(String::as_str), Some("r-1"));
    assert!(resp.body.is_empty());
}

// --- isolation ---

#[tokio::test]
async fn registries_do_not_leak_between_instances() {
    let desc = RequestDescriptor::<EmptyResponse>::get(HOST, ["health"]);
    let populated =
        transport_with(vec![MockExchange::for_descriptor(&desc, MockResponse::new(204)).unwrap()])
            .await;
    let fresh = MockTransport::new(MockRegistry::new());

    let req = RequestMapper::map(&desc).unwrap();
    assert!(populated.send(&req).await.is_ok());
    assert!(fresh.send(&req).await.is_err());
}
