//! HTTP request execution pipeline.
//!
//! # Overview
//! A `RequestDescriptor` declares one HTTP call. `NetworkManager::execute`
//! maps it into a `WireRequest`, lets an `Interceptor` adapt it and decide
//! retries, sends it through a `Transport`, validates the response and
//! decodes the body into the descriptor's model type.
//!
//! # Design
//! - Mapping, validation and decoding are pure and deterministic; all I/O
//!   sits behind the `Transport` trait, so tests replace the network with
//!   the `mock-transport` crate.
//! - Retries are bounded by `RetryPolicy` and end in `RetriesExhausted`.
//! - Logging goes through `tracing` and is switched by `NetworkConfig`,
//!   never by global state.

pub mod config;
pub mod decoder;
pub mod descriptor;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod logger;
pub mod manager;
pub mod mapper;
pub mod transport;
pub mod validator;

pub use config::{NetworkConfig, RetryPolicy};
pub use decoder::ResponseDecoder;
pub use descriptor::{EmptyResponse, RequestDescriptor, ResponseModel};
pub use error::{BoxError, NetworkError, Result};
pub use http::{Headers, HttpMethod, Response, TransportResponse, WireRequest, WireResponseMeta};
pub use interceptor::Interceptor;
pub use logger::Logger;
pub use manager::NetworkManager;
pub use mapper::RequestMapper;
pub use transport::{Transport, UreqTransport};
pub use validator::ResponseValidator;
