//! Deterministic stand-in for the network.
//!
//! # Design
//! A `MockRegistry` holds canned `MockExchange`s; `MockTransport` answers
//! each send with the first registered exchange whose pattern has the same
//! method, host, path and query items (compared as a set). Headers and body
//! never take part in matching.
//!
//! Registries are instance-scoped and cheap to clone, so every test builds
//! its own and nothing leaks between cases. Registration is
//! first-registered-wins: adding a second exchange with an equal pattern
//! is ignored and reported by `add` returning `false`.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use courier_core::http::{insert_header, Headers};
use courier_core::{
    HttpMethod, NetworkError, RequestDescriptor, RequestMapper, ResponseModel, Result, Transport,
    TransportResponse, WireRequest, WireResponseMeta,
};

/// The canned response half of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// Extra response headers, layered over the pattern's request headers.
    pub headers: Headers,
    /// When set, the send fails with a transport error carrying this message.
    pub error: Option<String>,
}

impl MockResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            headers: Headers::new(),
            error: None,
        }
    }

    /// A response whose send fails at the transport level.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new(200)
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json(mut self, value: serde_json::Value) -> Self {
        self.body = value.to_string().into_bytes();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, name.into(), value.into());
        self
    }
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::new(200)
    }
}

/// A registered (request pattern, response) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockExchange {
    pub request: WireRequest,
    pub response: MockResponse,
}

impl MockExchange {
    pub fn new(request: WireRequest, response: MockResponse) -> Self {
        Self { request, response }
    }

    /// Build the pattern by mapping `descriptor` the same way the manager does.
    pub fn for_descriptor<M: ResponseModel>(
        descriptor: &RequestDescriptor<M>,
        response: MockResponse,
    ) -> Result<Self> {
        Ok(Self::new(RequestMapper::map(descriptor)?, response))
    }

    pub fn matches(&self, request: &WireRequest) -> bool {
        MatchKey::of(&self.request) == MatchKey::of(request)
    }

    /// Response metadata, or `None` when the exchange cannot describe an
    /// HTTP response (pattern without a valid URL, or an impossible status).
    pub fn response_meta(&self) -> Option<WireResponseMeta> {
        self.request.url().ok()?;
        let mut headers = Headers::new();
        for (name, value) in self.request.headers.iter().chain(&self.response.headers) {
            insert_header(&mut headers, name.clone(), value.clone());
        }
        let meta = WireResponseMeta {
            status: self.response.status,
            headers,
        };
        meta.is_http().then_some(meta)
    }
}

/// The identity of an exchange: method, host, path, query items as a set.
#[derive(Debug, PartialEq, Eq)]
struct MatchKey<'a> {
    method: HttpMethod,
    host: &'a str,
    path: &'a str,
    query: BTreeSet<&'a (String, String)>,
}

impl<'a> MatchKey<'a> {
    fn of(request: &'a WireRequest) -> Self {
        Self {
            method: request.method,
            host: &request.host,
            path: &request.path,
            query: request.query_items.iter().collect(),
        }
    }
}

/// Shared set of mocked exchanges.
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    exchanges: Arc<RwLock<Vec<MockExchange>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `exchange`. Returns `false` and keeps the existing entry when
    /// an exchange with an equal pattern is already registered.
    pub async fn add(&self, exchange: MockExchange) -> bool {
        let mut exchanges = self.exchanges.write().await;
        if exchanges.iter().any(|known| known.matches(&exchange.request)) {
            tracing::warn!(
                method = %exchange.request.method,
                host = %exchange.request.host,
                path = %exchange.request.path,
                "mock exchange already registered, keeping the first one"
            );
            return false;
        }
        exchanges.push(exchange);
        true
    }

    /// Register several exchanges; returns how many were new.
    pub async fn add_all<I>(&self, exchanges: I) -> usize
    where
        I: IntoIterator<Item = MockExchange>,
    {
        let mut added = 0;
        for exchange in exchanges {
            if self.add(exchange).await {
                added += 1;
            }
        }
        added
    }

    /// Forget every registered exchange.
    pub async fn reset(&self) {
        self.exchanges.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.exchanges.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.exchanges.read().await.is_empty()
    }

    /// The exchange answering `request`, if any.
    pub async fn find(&self, request: &WireRequest) -> Option<MockExchange> {
        self.exchanges
            .read()
            .await
            .iter()
            .find(|exchange| exchange.matches(request))
            .cloned()
    }
}

/// `Transport` that answers from a `MockRegistry`.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    registry: MockRegistry,
}

impl MockTransport {
    pub fn new(registry: MockRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &MockRegistry {
        &self.registry
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &WireRequest) -> Result<TransportResponse> {
        let (method, url) = request.describe();
        let exchange = self
            .registry
            .find(request)
            .await
            .ok_or_else(|| NetworkError::MissingExchange {
                method: method.clone(),
                url: url.clone(),
            })?;

        let meta = exchange
            .response_meta()
            .ok_or(NetworkError::MissingResponse { method, url })?;

        if let Some(message) = exchange.response.error {
            return Err(NetworkError::Transport(message.into()));
        }

        Ok(TransportResponse {
            body: exchange.response.body,
            meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn request(method: HttpMethod, path: &str, query: &[(&str, &str)]) -> WireRequest {
        WireRequest {
            method,
            scheme: "https".to_string(),
            host: "api.example.com".to_string(),
            path: path.to_string(),
            query_items: query
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            headers: Headers::new(),
            body: None,
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn matching_ignores_query_order() {
        let exchange = MockExchange::new(
            request(HttpMethod::Get, "/search", &[("a", "1"), ("b", "2")]),
            MockResponse::new(200),
        );
        assert!(exchange.matches(&request(HttpMethod::Get, "/search", &[("b", "2"), ("a", "1")])));
    }

    #[test]
    fn matching_ignores_headers_and_body() {
        let exchange = MockExchange::new(
            request(HttpMethod::Post, "/login", &[]),
            MockResponse::new(201),
        );
        let mut incoming = request(HttpMethod::Post, "/login", &[]);
        incoming.set_header("Authorization", "Bearer x");
        incoming.body = Some(b"{}".to_vec());
        assert!(exchange.matches(&incoming));
    }

    #[test]
    fn matching_distinguishes_method_path_and_query() {
        let exchange = MockExchange::new(
            request(HttpMethod::Get, "/users", &[("page", "1")]),
            MockResponse::new(200),
        );
        assert!(!exchange.matches(&request(HttpMethod::Delete, "/users", &[("page", "1")])));
        assert!(!exchange.matches(&request(HttpMethod::Get, "/user", &[("page", "1")])));
        assert!(!exchange.matches(&request(HttpMethod::Get, "/users", &[("page", "2")])));
        assert!(!exchange.matches(&request(HttpMethod::Get, "/users", &[])));
    }

    #[test]
    fn response_meta_requires_valid_status() {
        let exchange = MockExchange::new(
            request(HttpMethod::Get, "/broken", &[]),
            MockResponse::new(1000),
        );
        assert!(exchange.response_meta().is_none());
    }

    #[test]
    fn response_meta_carries_pattern_and_response_headers() {
        let mut pattern = request(HttpMethod::Get, "/users", &[]);
        pattern.set_header("Accept", "application/json");
        let exchange = MockExchange::new(pattern, MockResponse::new(200).with_header("ETag", "v1"));
        let meta = exchange.response_meta().unwrap();
        assert_eq!(meta.status, 200);
        assert_eq!(meta.headers.get("Accept").map(String::as_str), Some("application/json"));
        assert_eq!(meta.headers.get("ETag").map(String::as_str), Some("v1"));
    }

    #[test]
    fn response_headers_replace_pattern_headers_ignoring_case() {
        let mut pattern = request(HttpMethod::Get, "/users", &[]);
        pattern.set_header("Content-Type", "application/json");
        let response = MockResponse::new(200)
            .with_header("etag", "v1")
            .with_header("ETag", "v2")
            .with_header("content-type", "text/plain");
        assert_eq!(response.headers.len(), 2);

        let meta = MockExchange::new(pattern, response).response_meta().unwrap();
        assert_eq!(meta.headers.len(), 2);
        assert_eq!(meta.headers.get("ETag").map(String::as_str), Some("v2"));
        assert_eq!(meta.headers.get("content-type").map(String::as_str), Some("text/plain"));
    }

    #[test]
    fn json_helper_writes_compact_body() {
        let response = MockResponse::new(201).with_json(serde_json::json!({"token": "abc"}));
        assert_eq!(response.body, br#"{"token":"abc"}"#);
    }

    #[tokio::test]
    async fn first_registered_exchange_wins() {
        let registry = MockRegistry::new();
        let pattern = request(HttpMethod::Get, "/health", &[]);
        assert!(registry.add(MockExchange::new(pattern.clone(), MockResponse::new(200))).await);
        assert!(!registry.add(MockExchange::new(pattern.clone(), MockResponse::new(500))).await);
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.find(&pattern).await.unwrap().response.status, 200);
    }

    #[tokio::test]
    async fn reset_empties_registry() {
        let registry = MockRegistry::new();
        let added = registry
            .add_all([
                MockExchange::new(request(HttpMethod::Get, "/a", &[]), MockResponse::new(200)),
                MockExchange::new(request(HttpMethod::Get, "/b", &[]), MockResponse::new(200)),
            ])
            .await;
        assert_eq!(added, 2);
        registry.reset().await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_the_same_exchanges() {
        let registry = MockRegistry::new();
        let transport = MockTransport::new(registry.clone());
        registry
            .add(MockExchange::new(request(HttpMethod::Get, "/a", &[]), MockResponse::new(200)))
            .await;
        assert_eq!(transport.registry().len().await, 1);
    }
}
