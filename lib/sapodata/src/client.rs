//! HTTP transport using hyper-util.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use sapodata_core::{SET_COOKIE_SEPARATOR, TransportError};
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::{
    Credential, Error, Request, Response, Result, SessionStore,
    config::ClientConfig,
    connector::https_connector,
    middleware::{BasicAuthLayer, LogLevel, LoggingLayer, SessionLayer},
};

// ============================================================================
// Type-Erased Service for Middleware Composition
// ============================================================================

/// Type-erased service for middleware composition.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future type for Tower Service implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

/// Thread-safe wrapper for `BoxedService`.
///
/// `BoxCloneService` is not `Sync`; the mutex is only held to clone it.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request<Bytes>) -> ServiceFuture {
        // Lock, clone the service, and release the lock immediately
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

// ============================================================================
// Raw Client
// ============================================================================

/// Raw HTTP client using hyper-util: default headers, timeout, buffering.
#[derive(Clone)]
struct RawHyperClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl RawHyperClient {
    fn new(config: ClientConfig) -> Self {
        let connector = https_connector(config.connect_timeout);

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    /// Build a hyper request, filling in the configured default headers.
    fn build_hyper_request(&self, mut request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
        for (name, value) in &self.config.default_headers {
            request.set_default_header(name, value.clone());
        }
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|err| TransportError::InvalidRequest(err.to_string()).into())
    }

    /// Collect response headers, one entry per name.
    ///
    /// Repeated headers are joined with `, `, except `Set-Cookie` whose values
    /// are joined with [`SET_COOKIE_SEPARATOR`].
    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        let mut extracted: HashMap<String, String> = HashMap::new();
        for (name, value) in headers {
            let Ok(value) = value.to_str() else {
                continue;
            };
            let separator = if *name == http::header::SET_COOKIE {
                SET_COOKIE_SEPARATOR.to_string()
            } else {
                ", ".to_string()
            };
            extracted
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(&separator);
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        extracted
    }

    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let hyper_request = self.build_hyper_request(request)?;

        let exchange = async {
            let response = self
                .inner
                .request(hyper_request)
                .await
                .map_err(Self::map_hyper_error)?;

            let status = response.status().as_u16();
            let response_headers = Self::extract_headers(response.headers());

            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|err| TransportError::Body(err.to_string()))?
                .to_bytes();

            Ok::<_, TransportError>(Response::new(status, response_headers, body))
        };

        tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(Error::from)
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> TransportError {
        let chain = source_chain(&err);
        let msg = if chain.is_empty() {
            err.to_string()
        } else {
            format!("{err}: {chain}")
        };

        let lower = msg.to_ascii_lowercase();
        if lower.contains("ssl") || lower.contains("tls") || lower.contains("certificate") {
            return TransportError::Tls(msg);
        }

        TransportError::Connection(msg)
    }
}

/// Messages of every error in the `source` chain, `: `-joined.
fn source_chain(err: &dyn std::error::Error) -> String {
    let mut messages = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        messages.push(source.to_string());
        current = source.source();
    }
    messages.join(": ")
}

impl Service<Request<Bytes>> for RawHyperClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send + 'static>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.execute(request).await })
    }
}

// ============================================================================
// Public Client
// ============================================================================

/// HTTP client using hyper-util with connection pooling, TLS, and middleware support.
///
/// # Example
///
/// ```no_run
/// use sapodata::{Credential, HyperClient, SessionStore};
/// use std::time::Duration;
///
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(10))
///     .with_session(SessionStore::new())
///     .with_basic_auth(&Credential::new("DEVELOPER", "secret"))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    service: SyncService,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Create a new client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration (no middleware).
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let raw = RawHyperClient::new(config.clone());
        Self {
            service: SyncService::new(BoxCloneService::new(raw)),
            config,
        }
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl sapodata_core::HttpClient for HyperClient {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.service.call(request).await
    }
}

impl Service<Request<Bytes>> for HyperClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        // SyncService is always ready (the underlying service is polled when called)
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperClient`].
///
/// Each layer wraps the ones added before it: the last one added is the
/// first to see a request.
#[derive(Default)]
pub struct HyperClientBuilder {
    config: Option<ClientConfig>,
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    // ========================================================================
    // Core Configuration
    // ========================================================================

    /// Use `config` instead of the defaults.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the request timeout, keeping the rest of the configuration.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.get_or_insert_with(ClientConfig::default).timeout = timeout;
        self
    }

    // ========================================================================
    // Middleware
    // ========================================================================

    /// Add a Tower layer to the client.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Keep cookies and revalidate cached responses in `store`.
    #[must_use]
    pub fn with_session(self, store: SessionStore) -> Self {
        self.layer(SessionLayer::new(store))
    }

    /// Answer `WWW-Authenticate: Basic` challenges with `credential`.
    #[must_use]
    pub fn with_basic_auth(self, credential: &Credential) -> Self {
        self.layer(BasicAuthLayer::new(credential))
    }

    /// Add request/response logging.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new(LogLevel::Info))
    }

    /// Add debug-level logging (includes headers).
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::new(LogLevel::Debug))
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the client with all configured middleware.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.unwrap_or_default();
        let mut service: BoxedService = BoxCloneService::new(RawHyperClient::new(config.clone()));

        for layer_fn in self.layers {
            service = layer_fn(service);
        }

        HyperClient {
            service: SyncService::new(service),
            config,
        }
    }
}
