//! Cookie and `ETag` cache middleware backed by a [`SessionStore`].
//!
//! Outgoing requests get the stored cookies for their host and, for a `GET`
//! with a cached response, an `If-None-Match` header. Incoming `Set-Cookie`
//! headers are stored; a `304` to a conditional request is answered with the
//! cached response.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::debug;

use crate::{Error, Method, Request, Response, Result, SessionStore};

/// Layer that attaches a [`SessionStore`] to the transport.
#[derive(Debug, Clone)]
pub struct SessionLayer {
    store: SessionStore,
}

impl SessionLayer {
    /// Use `store` for cookies and cached responses.
    #[must_use]
    pub const fn new(store: SessionStore) -> Self {
        Self { store }
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = Session<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Session {
            inner,
            store: self.store.clone(),
        }
    }
}

/// Service that sends and records cookies and revalidates cached responses.
#[derive(Debug, Clone)]
pub struct Session<S> {
    inner: S,
    store: SessionStore,
}

impl<S> Service<Request<Bytes>> for Session<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        let store = self.store.clone();
        let url = request.url().clone();
        let is_get = request.method() == Method::Get;

        if let Some(cookie) = store.cookie_header(&url) {
            request.set_default_header("cookie", cookie);
        }

        // Only revalidate when the caller did not ask for its own condition.
        let mut revalidating = false;
        if is_get
            && request.header("if-none-match").is_none()
            && let Some(etag) = store.etag(&url)
        {
            request.set_header("if-none-match", etag);
            revalidating = true;
        }

        let mut inner = self.inner.clone();
        Box::pin(async move {
            let response = inner.call(request).await?;
            store.store_cookies(&url, &response);

            if revalidating
                && response.status() == 304
                && let Some(cached) = store.cached_response(&url)
            {
                debug!(%url, "not modified, serving cached response");
                return Ok(cached);
            }

            if is_get {
                store.store_response(&url, &response);
            }
            Ok(response)
        })
    }
}
