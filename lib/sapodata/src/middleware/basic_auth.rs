//! Basic challenge middleware.
//!
//! Requests go out without credentials. When the server answers `401` with a
//! `WWW-Authenticate: Basic` challenge, the request is replayed once with an
//! `Authorization: Basic` header. Any other challenge scheme is left alone
//! and the `401` flows through unchanged.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::debug;

use crate::{Credential, Error, Request, Response, Result};

/// Layer that answers basic authentication challenges.
#[derive(Debug, Clone)]
pub struct BasicAuthLayer {
    /// `Basic <base64(user:pass)>`.
    authorization: Arc<str>,
}

impl BasicAuthLayer {
    /// Answer basic challenges with `credential`.
    #[must_use]
    pub fn new(credential: &Credential) -> Self {
        Self {
            authorization: Arc::from(credential.authorization()),
        }
    }
}

impl<S> Layer<S> for BasicAuthLayer {
    type Service = BasicAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BasicAuth {
            inner,
            authorization: Arc::clone(&self.authorization),
        }
    }
}

/// Service that answers basic authentication challenges.
#[derive(Debug, Clone)]
pub struct BasicAuth<S> {
    inner: S,
    authorization: Arc<str>,
}

/// Whether a `WWW-Authenticate` value offers the `Basic` scheme.
///
/// Several challenges may be folded into one value (`Negotiate, Basic realm="SAP"`).
fn offers_basic(challenge: &str) -> bool {
    challenge.split(',').any(|part| {
        part.split_whitespace()
            .next()
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("basic"))
    })
}

fn is_basic_challenge(response: &Response) -> bool {
    response.status() == 401 && response.header("www-authenticate").is_some_and(offers_basic)
}

impl<S> Service<Request<Bytes>> for BasicAuth<S>
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

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let authorization = Arc::clone(&self.authorization);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // A caller-supplied Authorization is not second-guessed.
            if request.header("authorization").is_some() {
                return inner.call(request).await;
            }

            let mut replay = request.clone();
            let response = inner.call(request).await?;
            if !is_basic_challenge(&response) {
                return Ok(response);
            }

            debug!(url = %replay.url(), "answering basic authentication challenge");
            replay.set_header("authorization", authorization.as_ref());
            inner.call(replay).await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::check;

    use super::*;

    #[test]
    fn layer_holds_encoded_credential() {
        let layer = BasicAuthLayer::new(&Credential::new("user", "pass"));
        check!(&*layer.authorization == "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn detects_basic_scheme() {
        check!(offers_basic(r#"Basic realm="SAP NetWeaver Application Server""#));
        check!(offers_basic("basic"));
        check!(offers_basic(r#"Negotiate, Basic realm="SAP""#));
        check!(!offers_basic("Bearer"));
        check!(!offers_basic(r#"Digest realm="x", nonce="basic""#));
    }

    #[test]
    fn only_401_is_a_challenge() {
        let headers = HashMap::from([("WWW-Authenticate".to_string(), "Basic".to_string())]);
        check!(is_basic_challenge(&Response::new(401, headers.clone(), Bytes::new())));
        check!(!is_basic_challenge(&Response::new(403, headers, Bytes::new())));
        check!(!is_basic_challenge(&Response::new(401, HashMap::new(), Bytes::new())));
    }
}
