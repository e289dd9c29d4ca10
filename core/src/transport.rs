//! Transport seam and the production HTTPS transport.
//!
//! # Design
//! `Transport` is the only place I/O happens. The manager hands it a fully
//! adapted `WireRequest` and gets back raw bytes plus response metadata;
//! status interpretation stays in the validator. Tests swap in the mock
//! transport from the `mock-transport` crate.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{NetworkError, Result};
use crate::http::{Headers, HttpMethod, TransportResponse, WireRequest, WireResponseMeta};

/// Executes wire requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &WireRequest) -> Result<TransportResponse>;
}

/// HTTPS transport backed by `ureq`.
///
/// A fresh agent is configured for every send, so no cookies, caches or
/// connections are shared between calls. The request timeout becomes the
/// agent's global timeout, and 4xx/5xx statuses come back as data. A body is
/// sent whenever the request has one, whatever the method.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }

    fn send_blocking(request: WireRequest) -> Result<TransportResponse> {
        let url = request.url()?.to_string();
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(request.timeout))
            .build()
            .new_agent();

        // GET and DELETE only carry a body when the descriptor supplied one.
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, Some(body)) => with_headers(agent.get(&url), &request.headers)
                .force_send_body()
                .send(body),
            (HttpMethod::Get, None) => with_headers(agent.get(&url), &request.headers).call(),
            (HttpMethod::Delete, Some(body)) => {
                with_headers(agent.delete(&url), &request.headers)
                    .force_send_body()
                    .send(body)
            }
            (HttpMethod::Delete, None) => {
                with_headers(agent.delete(&url), &request.headers).call()
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(agent.post(&url), &request.headers).send(body)
            }
            (HttpMethod::Post, None) => with_headers(agent.post(&url), &request.headers).send_empty(),
            (HttpMethod::Patch, Some(body)) => {
                with_headers(agent.patch(&url), &request.headers).send(body)
            }
            (HttpMethod::Patch, None) => {
                with_headers(agent.patch(&url), &request.headers).send_empty()
            }
        };
        let mut response = result.map_err(NetworkError::transport)?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(NetworkError::transport)?;

        debug!(status, bytes = body.len(), "ureq transport received response");
        Ok(TransportResponse {
            body,
            meta: WireResponseMeta { status, headers },
        })
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: &WireRequest) -> Result<TransportResponse> {
        let request = request.clone();
        tokio::task::spawn_blocking(move || Self::send_blocking(request))
            .await
            .map_err(NetworkError::transport)?
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &Headers,
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
