//! Request/response log events.
//!
//! `Logger` is owned by the manager and built from `NetworkConfig`; when
//! logging is disabled every call is a no-op.

use crate::error::NetworkError;
use crate::http::{WireRequest, WireResponseMeta};

#[derive(Debug, Clone, Copy)]
pub struct Logger {
    enabled: bool,
}

impl Logger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn log_request(&self, request: &WireRequest, attempt: u32) {
        if !self.enabled {
            return;
        }
        let (method, url) = request.describe();
        tracing::info!(
            %method,
            %url,
            headers = ?request.headers,
            attempt,
            "outgoing request"
        );
    }

    pub fn log_response(&self, meta: &WireResponseMeta, body: &[u8]) {
        if !self.enabled {
            return;
        }
        tracing::info!(status = meta.status, headers = ?meta.headers, "response received");
        if let Some(json) = pretty_json(body) {
            tracing::debug!("{json}");
        }
    }

    pub fn log_error(&self, error: &NetworkError) {
        if !self.enabled {
            return;
        }
        tracing::error!(error = %error, "request failed");
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Pretty-print `bytes` if they hold JSON.
pub fn pretty_json(bytes: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
