//! Request execution pipeline.
//!
//! # Design
//! `NetworkManager::execute` drives one call through
//! map -> adapt -> send -> log -> (retry | validate) -> decode. Every stage
//! fails fast; the manager logs the error and hands it back unchanged. Every
//! HTTP response is logged as it arrives, including ones that are retried
//! or later rejected by validation. The only
//! re-execution is the interceptor-driven retry, which runs as a bounded
//! loop with backoff and ends in `RetriesExhausted` once the policy's
//! budget is spent. Each attempt re-adapts the originally mapped request,
//! so adaptations never accumulate across retries.

use std::sync::Arc;

use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::config::{NetworkConfig, RetryPolicy};
use crate::decoder::ResponseDecoder;
use crate::descriptor::{RequestDescriptor, ResponseModel};
use crate::error::{NetworkError, Result};
use crate::http::{Response, TransportResponse};
use crate::interceptor::Interceptor;
use crate::logger::Logger;
use crate::mapper::RequestMapper;
use crate::transport::{Transport, UreqTransport};
use crate::validator::ResponseValidator;

/// Executes request descriptors over a transport.
///
/// Holds no per-call state, so one instance can serve concurrent calls.
#[derive(Clone)]
pub struct NetworkManager {
    transport: Arc<dyn Transport>,
    interceptor: Interceptor,
    retry: RetryPolicy,
    logger: Logger,
}

impl NetworkManager {
    pub fn new(config: NetworkConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            interceptor: Interceptor::default(),
            retry: config.retry,
            logger: Logger::new(config.logging_enabled),
        }
    }

    /// Manager over the production HTTPS transport.
    pub fn ephemeral(config: NetworkConfig) -> Self {
        Self::new(config, Arc::new(UreqTransport::new()))
    }

    pub fn with_interceptor(mut self, interceptor: Interceptor) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Execute `descriptor` and decode the response into `M`.
    pub async fn execute<M: ResponseModel>(
        &self,
        descriptor: &RequestDescriptor<M>,
    ) -> Result<Response<M>> {
        let span = tracing::info_span!(
            "execute",
            request_id = %Uuid::new_v4(),
            method = %descriptor.method(),
            host = %descriptor.host(),
        );
        async {
            let result = self.run(descriptor).await;
            if let Err(err) = &result {
                self.logger.log_error(err);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run<M: ResponseModel>(
        &self,
        descriptor: &RequestDescriptor<M>,
    ) -> Result<Response<M>> {
        let mapped = RequestMapper::map(descriptor)?;
        let mut attempt: u32 = 0;

        loop {
            let mut request = self.interceptor.adapt(mapped.clone());
            let url = request
                .url()
                .map_err(|e| NetworkError::InvalidUrlRequest {
                    reason: e.to_string(),
                })?;
            request.path = url.path().to_string();

            self.logger.log_request(&request, attempt);
            let TransportResponse { body, meta } = self.transport.send(&request).await?;

            if !meta.is_http() {
                return Err(NetworkError::InvalidUrlResponse {
                    status: meta.status,
                });
            }
            self.logger.log_response(&meta, &body);

            if self.interceptor.should_retry(&request, &meta) {
                if attempt >= self.retry.max_retries {
                    return Err(NetworkError::RetriesExhausted {
                        attempts: attempt + 1,
                    });
                }
                let delay = self.retry.delay_for(attempt);
                debug!(
                    retry = attempt + 1,
                    max_retries = self.retry.max_retries,
                    status = meta.status,
                    backoff = ?delay,
                    "interceptor requested retry"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
                continue;
            }

            ResponseValidator::validate(meta.status, &body)?;

            let model = ResponseDecoder::decode(descriptor, meta.status, &body)?;
            return Ok(Response {
                request,
                status: meta.status,
                model,
            });
        }
    }
}
