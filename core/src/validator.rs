//! Response classification.
//!
//! # Design
//! Rules run in a fixed order: status class first, then body emptiness,
//! then body well-formedness. A non-2xx status fails without the body ever
//! being inspected, so an empty 500 reports `HttpStatus(500)` rather than
//! an emptiness error.

use crate::error::{NetworkError, Result};

/// Statuses that allow a 2xx response to have no body.
pub const EMPTY_BODY_STATUSES: [u16; 2] = [204, 205];

/// Whether `status` permits an empty response body.
pub fn allows_empty_body(status: u16) -> bool {
    EMPTY_BODY_STATUSES.contains(&status)
}

/// Classifies a response as success or failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn validate(status: u16, body: &[u8]) -> Result<()> {
        if !(200..=299).contains(&status) {
            return Err(NetworkError::HttpStatus(status));
        }

        if body.is_empty() {
            return if allows_empty_body(status) {
                Ok(())
            } else {
                Err(NetworkError::UnexpectedEmptyBody { status })
            };
        }

        let document: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| NetworkError::InvalidBodyFormat {
                reason: e.to_string(),
            })?;

        // Only objects and arrays count as documents.
        if document.is_object() || document.is_array() {
            Ok(())
        } else {
            Err(NetworkError::InvalidBodyFormat {
                reason: "top-level value is not an object or array".to_string(),
            })
        }
    }
}
