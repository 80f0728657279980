//! HTTP transport trait.
//!
//! The facade only needs "send this request, give me the buffered response".
//! Implement [`HttpClient`] to plug in another transport or a test double.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Core HTTP client trait.
///
/// Implementations should be async-first and support connection pooling.
/// Any status code is a successful execution: classification happens later.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RequestFailed`] if no response was received:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - Unreadable response body
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).execute(request)
    }
}
