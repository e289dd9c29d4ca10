//! Request adaptation and retry policy.

use std::fmt;
use std::sync::Arc;

use crate::http::{WireRequest, WireResponseMeta};

type AdaptFn = Arc<dyn Fn(WireRequest) -> WireRequest + Send + Sync>;
type ShouldRetryFn = Arc<dyn Fn(&WireRequest, &WireResponseMeta) -> bool + Send + Sync>;

/// Policy value applied around every send attempt.
///
/// `adapt` runs on the originally mapped request before each attempt,
/// retries included. `should_retry` runs after each send, before the
/// response is validated.
#[derive(Clone)]
pub struct Interceptor {
    adapt: AdaptFn,
    should_retry: ShouldRetryFn,
}

impl Interceptor {
    pub fn new<A, R>(adapt: A, should_retry: R) -> Self
    where
        A: Fn(WireRequest) -> WireRequest + Send + Sync + 'static,
        R: Fn(&WireRequest, &WireResponseMeta) -> bool + Send + Sync + 'static,
    {
        Self {
            adapt: Arc::new(adapt),
            should_retry: Arc::new(should_retry),
        }
    }

    /// Identity adaptation, never retries.
    pub fn passthrough() -> Self {
        Self::new(|request| request, |_, _| false)
    }

    /// Only adapt; never retry.
    pub fn adapting<A>(adapt: A) -> Self
    where
        A: Fn(WireRequest) -> WireRequest + Send + Sync + 'static,
    {
        Self::new(adapt, |_, _| false)
    }

    /// Only decide retries; requests pass through unchanged.
    pub fn retrying<R>(should_retry: R) -> Self
    where
        R: Fn(&WireRequest, &WireResponseMeta) -> bool + Send + Sync + 'static,
    {
        Self::new(|request| request, should_retry)
    }

    pub fn adapt(&self, request: WireRequest) -> WireRequest {
        (self.adapt)(request)
    }

    pub fn should_retry(&self, request: &WireRequest, response: &WireResponseMeta) -> bool {
        (self.should_retry)(request, response)
    }
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::passthrough()
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor").finish_non_exhaustive()
    }
}
