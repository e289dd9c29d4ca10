//! Descriptor to wire-request mapping.
//!
//! Mapping is pure: the same descriptor always yields the same
//! `WireRequest`. Query items are sorted by name so the wire output never
//! depends on map iteration order.

use crate::descriptor::{RequestDescriptor, ResponseModel};
use crate::error::Result;
use crate::http::{insert_header, Headers, WireRequest};

/// Scheme forced on every mapped request.
pub const SCHEME: &str = "https";

/// Turns descriptors into transport-ready requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMapper;

impl RequestMapper {
    /// Map `descriptor` into a `WireRequest`.
    ///
    /// Fails with `InvalidUrl` when the host cannot form a URL authority, and
    /// with the encoder's own error (as `Codec`) when body encoding fails.
    pub fn map<M: ResponseModel>(descriptor: &RequestDescriptor<M>) -> Result<WireRequest> {
        let path = format!("/{}", descriptor.path().join("/"));

        let mut query_items: Vec<(String, String)> = descriptor
            .query_params()
            .map(|query| {
                query
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        query_items.sort();

        let mut headers = Headers::new();
        for (name, value) in descriptor
            .default_header_map()
            .iter()
            .chain(descriptor.custom_header_map())
        {
            insert_header(&mut headers, name.clone(), value.clone());
        }

        let mut request = WireRequest {
            method: descriptor.method(),
            scheme: SCHEME.to_string(),
            host: descriptor.host().to_string(),
            path,
            query_items,
            headers,
            body: None,
            timeout: descriptor.timeout_value(),
        };

        // URL construction is the validity check for host and path. The
        // stored path is the normalized one the transport will send.
        request.path = request.url()?.path().to_string();

        request.body = descriptor.encode_body()?;
        Ok(request)
    }
}
