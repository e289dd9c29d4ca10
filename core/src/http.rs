//! Wire-level request and response types.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! mapper produces a `WireRequest` from a descriptor, interceptors rewrite
//! it, and a `Transport` executes it. Keeping them as owned, comparable
//! values is what lets the mock transport match requests structurally.
//!
//! Headers live in a `BTreeMap` and query items are kept sorted, so two
//! equal descriptors always produce equal `WireRequest`s.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{NetworkError, Result};

/// Header map keyed by header name.
pub type Headers = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved, transport-ready HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: HttpMethod,
    pub scheme: String,
    pub host: String,
    /// Always starts with `/`.
    pub path: String,
    /// Sorted by name, then value.
    pub query_items: Vec<(String, String)>,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

impl WireRequest {
    /// Build the absolute URL from the request components.
    pub fn url(&self) -> Result<Url> {
        build_url(&self.scheme, &self.host, &self.path, &self.query_items)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a header, replacing any existing entry whose name differs only
    /// in case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        insert_header(&mut self.headers, name.into(), value.into());
    }

    /// Render `method url` for log lines and error messages.
    pub fn describe(&self) -> (String, String) {
        let url = self
            .url()
            .map(|url| url.to_string())
            .unwrap_or_else(|_| format!("{}://{}{}", self.scheme, self.host, self.path));
        (self.method.to_string(), url)
    }
}

/// Status line and headers of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponseMeta {
    pub status: u16,
    pub headers: Headers,
}

impl WireResponseMeta {
    /// Whether the status is a syntactically valid HTTP status.
    pub fn is_http(&self) -> bool {
        (100..=599).contains(&self.status)
    }
}

/// Raw result of a transport send: the body bytes plus response metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub body: Vec<u8>,
    pub meta: WireResponseMeta,
}

/// The decoded outcome of a successful `execute` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<M> {
    /// The request as it was last sent, after interception.
    pub request: WireRequest,
    pub status: u16,
    pub model: M,
}

/// Insert a header, replacing any existing entry whose name differs only in
/// case.
pub fn insert_header(headers: &mut Headers, name: String, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

pub(crate) fn build_url(
    scheme: &str,
    host: &str,
    path: &str,
    query_items: &[(String, String)],
) -> Result<Url> {
    let invalid = |reason: String| NetworkError::InvalidUrl {
        host: host.to_string(),
        reason,
    };

    if host.is_empty() {
        return Err(invalid("host is empty".to_string()));
    }
    if let Some(c) = host
        .chars()
        .find(|c| matches!(c, '/' | '?' | '#' | '@') || c.is_whitespace())
    {
        return Err(invalid(format!("host contains '{c}'")));
    }

    let mut url = Url::parse(&format!("{scheme}://{host}")).map_err(|e| invalid(e.to_string()))?;
    url.set_path(path);
    if !query_items.is_empty() {
        url.query_pairs_mut().extend_pairs(query_items.iter());
    }
    Ok(url)
}
