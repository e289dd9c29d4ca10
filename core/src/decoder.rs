//! Body to model conversion.

use crate::descriptor::{RequestDescriptor, ResponseModel};
use crate::error::{NetworkError, Result};

/// Converts validated response bodies into models.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseDecoder;

impl ResponseDecoder {
    /// Decode `body` for `descriptor`.
    ///
    /// An empty body never reaches the decode function: the model's
    /// `from_empty` value is used, or `InvalidEmptyResponseModel` when the
    /// model has none.
    pub fn decode<M: ResponseModel>(
        descriptor: &RequestDescriptor<M>,
        status: u16,
        body: &[u8],
    ) -> Result<M> {
        if body.is_empty() {
            return M::from_empty().ok_or(NetworkError::InvalidEmptyResponseModel { status });
        }
        descriptor.decode_body(body)
    }
}
