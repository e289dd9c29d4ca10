//! Declarative description of one HTTP call.
//!
//! # Design
//! A `RequestDescriptor<M>` is an immutable value assembled with a consuming
//! builder. The target model `M` is fixed at the type level, and the body
//! encoder and model decoder are opaque function handles, so the pipeline
//! never needs to know which wire format a caller uses. JSON via
//! `serde_json` is the default for both directions.
//!
//! Whether `M` can stand in for a `204`/`205` response without bytes is a
//! compile-time capability expressed by `ResponseModel::from_empty`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{BoxError, NetworkError, Result};
use crate::http::{insert_header, Headers, HttpMethod};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Encodes the descriptor's body into bytes.
pub type EncodeFn = Arc<dyn Fn() -> std::result::Result<Vec<u8>, BoxError> + Send + Sync>;

/// Decodes response bytes into the target model.
pub type DecodeFn<M> = Arc<dyn Fn(&[u8]) -> std::result::Result<M, BoxError> + Send + Sync>;

/// A response model type.
///
/// Implement with an empty body for models that always need content.
/// Override `from_empty` for models that can represent "no content".
pub trait ResponseModel: Sized {
    /// The value produced for a `204`/`205` response with no body.
    fn from_empty() -> Option<Self> {
        None
    }
}

/// Model for endpoints that answer without content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyResponse;

impl ResponseModel for EmptyResponse {
    fn from_empty() -> Option<Self> {
        Some(EmptyResponse)
    }
}

impl ResponseModel for () {
    fn from_empty() -> Option<Self> {
        Some(())
    }
}

impl ResponseModel for serde_json::Value {}

impl<T> ResponseModel for Vec<T> {}

/// Headers every descriptor starts with.
pub fn default_headers() -> Headers {
    Headers::from([
        ("Accept".to_string(), "application/json".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ])
}

/// Caller-supplied description of one HTTP call producing a model `M`.
pub struct RequestDescriptor<M> {
    host: String,
    path: Vec<String>,
    method: HttpMethod,
    query: Option<BTreeMap<String, String>>,
    default_headers: Headers,
    custom_headers: Headers,
    body: Option<EncodeFn>,
    decode: DecodeFn<M>,
    timeout: Duration,
}

impl<M> RequestDescriptor<M>
where
    M: ResponseModel + DeserializeOwned + 'static,
{
    /// Start a descriptor whose response is decoded as JSON.
    pub fn new<I, S>(method: HttpMethod, host: &str, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_decoder(method, host, path, json_decoder())
    }

    pub fn get<I, S>(host: &str, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Get, host, path)
    }

    pub fn post<I, S>(host: &str, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Post, host, path)
    }

    pub fn patch<I, S>(host: &str, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Patch, host, path)
    }

    pub fn delete<I, S>(host: &str, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Delete, host, path)
    }
}

impl<M> RequestDescriptor<M>
where
    M: ResponseModel,
{
    /// Start a descriptor with an explicit decode function.
    pub fn with_decoder<I, S>(method: HttpMethod, host: &str, path: I, decode: DecodeFn<M>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            host: host.to_string(),
            path: path.into_iter().map(Into::into).collect(),
            method,
            query: None,
            default_headers: default_headers(),
            custom_headers: Headers::new(),
            body: None,
            decode,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Add a query parameter. Any `ToString` value is accepted.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.to_string());
        self
    }

    /// Add a custom header. Custom headers win over the defaults.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.custom_headers, name.into(), value.into());
        self
    }

    /// Replace the default header set.
    pub fn default_headers(mut self, headers: Headers) -> Self {
        self.default_headers = headers;
        self
    }

    /// Attach a body encoded as JSON when the request is mapped.
    pub fn json_body<B>(self, body: B) -> Self
    where
        B: Serialize + Send + Sync + 'static,
    {
        self.body_with(body, |value: &B| -> std::result::Result<Vec<u8>, BoxError> {
            Ok(serde_json::to_vec(value)?)
        })
    }

    /// Attach a body together with the function that encodes it.
    pub fn body_with<B, F>(mut self, body: B, encode: F) -> Self
    where
        B: Send + Sync + 'static,
        F: Fn(&B) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(move || encode(&body)));
        self
    }

    /// Swap the decode function.
    pub fn decode_with(mut self, decode: DecodeFn<M>) -> Self {
        self.decode = decode;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn query_params(&self) -> Option<&BTreeMap<String, String>> {
        self.query.as_ref()
    }

    pub fn default_header_map(&self) -> &Headers {
        &self.default_headers
    }

    pub fn custom_header_map(&self) -> &Headers {
        &self.custom_headers
    }

    pub fn timeout_value(&self) -> Duration {
        self.timeout
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Run the body encoder. Encoder failures surface as `Codec` errors.
    pub fn encode_body(&self) -> Result<Option<Vec<u8>>> {
        self.body
            .as_ref()
            .map(|encode| encode().map_err(NetworkError::Codec))
            .transpose()
    }

    /// Run the decode function on a response body.
    pub fn decode_body(&self, bytes: &[u8]) -> Result<M> {
        (self.decode)(bytes).map_err(NetworkError::Codec)
    }
}

impl<M> Clone for RequestDescriptor<M> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            path: self.path.clone(),
            method: self.method,
            query: self.query.clone(),
            default_headers: self.default_headers.clone(),
            custom_headers: self.custom_headers.clone(),
            body: self.body.clone(),
            decode: Arc::clone(&self.decode),
            timeout: self.timeout,
        }
    }
}

impl<M> fmt::Debug for RequestDescriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("host", &self.host)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("default_headers", &self.default_headers)
            .field("custom_headers", &self.custom_headers)
            .field("has_body", &self.body.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// The default JSON decode function.
pub fn json_decoder<M>() -> DecodeFn<M>
where
    M: DeserializeOwned + 'static,
{
    Arc::new(|bytes: &[u8]| -> std::result::Result<M, BoxError> {
        Ok(serde_json::from_slice(bytes)?)
    })
}
