//! The OData client facade.
//!
//! [`ODataClient`] sends a request through any [`HttpClient`], classifies the
//! response by status range and decodes the `d` envelope into the caller's
//! type. Entities can be mirrored into a [`PersistentStore`] on the way.

use std::sync::Arc;

use bytes::Bytes;
use image::DynamicImage;
use sapodata_core::{EntityDecoder, HttpClient, PersistentStore, classify};
use serde::de::DeserializeOwned;
use tracing::info;
use url::Url;

use crate::middleware::LogLevel;
use crate::{ClientConfig, Credential, Error, HyperClient, Request, Result, SessionStore};

/// Typed client for an OData v2 service.
///
/// # Example
///
/// ```no_run
/// use sapodata::{Credential, ODataClient};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Product {
///     #[serde(rename = "ProductID")]
///     id: u32,
///     #[serde(rename = "ProductName")]
///     name: String,
/// }
///
/// # async fn run() -> sapodata::Result<()> {
/// let client = ODataClient::builder()
///     .credential(Credential::new("DEVELOPER", "secret"))
///     .with_logging()
///     .build();
///
/// let product: Product = client
///     .get_entity("https://services.odata.org/V2/Northwind/Northwind.svc/Products(1)?$format=json")
///     .await?;
/// let products: Vec<Product> = client
///     .get_entity_set("https://services.odata.org/V2/Northwind/Northwind.svc/Products?$format=json")
///     .await?;
///
/// client.logout();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ODataClient<C = HyperClient> {
    client: C,
    decoder: EntityDecoder,
    session: SessionStore,
}

impl ODataClient<HyperClient> {
    /// Client with the default configuration, no credential and no store.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> ODataClientBuilder {
        ODataClientBuilder::default()
    }
}

impl Default for ODataClient<HyperClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HttpClient> ODataClient<C> {
    /// Facade over an arbitrary transport.
    ///
    /// `session` is the handle [`ODataClient::logout`] clears; it is up to the
    /// transport to read and fill it.
    #[must_use]
    pub const fn with_transport(client: C, session: SessionStore, decoder: EntityDecoder) -> Self {
        Self {
            client,
            decoder,
            session,
        }
    }

    /// The underlying transport.
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.client
    }

    /// The session handle cleared by [`ODataClient::logout`].
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Whether decoded entities are mirrored into a store.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.decoder.is_persistent()
    }

    // ========================================================================
    // Single entity
    // ========================================================================

    /// `GET url` and decode `{"d": T}`.
    pub async fn get_entity<T: DeserializeOwned>(&self, url: impl AsRef<str>) -> Result<T> {
        let url = Url::parse(url.as_ref())?;
        self.get_entity_for(Request::get(url)).await
    }

    /// Send `request` and decode `{"d": T}`.
    ///
    /// # Errors
    ///
    /// - [`Error::RequestFailed`] when no response arrived
    /// - [`Error::Redirection`], [`Error::Client`], [`Error::Server`], [`Error::Unknown`] for non-2xx statuses
    /// - [`Error::Parsing`] when a 2xx body does not match the envelope or `T`
    /// - [`Error::Persistence`] when the store rejects the entity
    pub async fn get_entity_for<T: DeserializeOwned>(&self, request: Request<Bytes>) -> Result<T> {
        let response = self.client.execute(request).await?;
        classify(response, |body: &[u8]| self.decoder.decode_one(body))?.into_result()
    }

    // ========================================================================
    // Entity set
    // ========================================================================

    /// `GET url` and decode `{"d": {"results": [T]}}`.
    pub async fn get_entity_set<T: DeserializeOwned>(&self, url: impl AsRef<str>) -> Result<Vec<T>> {
        let url = Url::parse(url.as_ref())?;
        self.get_entity_set_for(Request::get(url)).await
    }

    /// Send `request` and decode `{"d": {"results": [T]}}`, in server order.
    ///
    /// Errors as for [`ODataClient::get_entity_for`].
    pub async fn get_entity_set_for<T: DeserializeOwned>(
        &self,
        request: Request<Bytes>,
    ) -> Result<Vec<T>> {
        let response = self.client.execute(request).await?;
        classify(response, |body: &[u8]| self.decoder.decode_many(body))?.into_result()
    }

    // ========================================================================
    // Binary resources
    // ========================================================================

    /// `GET url` with `Accept: image/*` and decode the body as an image.
    pub async fn get_image(&self, url: impl AsRef<str>) -> Result<DynamicImage> {
        let url = Url::parse(url.as_ref())?;
        let request = Request::builder(crate::Method::Get, url)
            .header("accept", "image/*")
            .build();
        self.get_image_for(request).await
    }

    /// Send `request` and decode the body as an image (PNG, JPEG, GIF, WebP).
    ///
    /// Errors as for [`ODataClient::get_entity_for`]; an undecodable image is
    /// [`Error::Parsing`]. Images are never persisted.
    pub async fn get_image_for(&self, request: Request<Bytes>) -> Result<DynamicImage> {
        let response = self.client.execute(request).await?;
        classify(response, decode_image)?.into_result()
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Forget every stored cookie and cached response.
    ///
    /// Requests sent afterwards carry no cookie from before the call.
    pub fn logout(&self) {
        let cookies = self.session.cookie_count();
        let cached = self.session.cached_count();
        self.session.clear();
        info!(cookies, cached, "logged out, session cleared");
    }
}

fn decode_image(body: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(body).map_err(|err| Error::parsing(".", err.to_string()))
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ODataClient`] over [`HyperClient`].
#[derive(Default)]
pub struct ODataClientBuilder {
    config: Option<ClientConfig>,
    credential: Option<Credential>,
    store: Option<Arc<dyn PersistentStore>>,
    session: Option<SessionStore>,
    logging: Option<LogLevel>,
}

impl std::fmt::Debug for ODataClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ODataClientBuilder")
            .field("config", &self.config)
            .field("credential", &self.credential)
            .field("persistent", &self.store.is_some())
            .field("session", &self.session)
            .field("logging", &self.logging)
            .finish()
    }
}

impl ODataClientBuilder {
    /// Use `config` instead of the defaults (default headers included).
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Answer basic authentication challenges with `credential`.
    #[must_use]
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Mirror every decoded entity into `store`.
    #[must_use]
    pub fn persistent_store(mut self, store: impl PersistentStore + 'static) -> Self {
        let store: Arc<dyn PersistentStore> = Arc::new(store);
        self.store = Some(store);
        self
    }

    /// Share `session` instead of creating a fresh one.
    #[must_use]
    pub fn session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Log each request at info level.
    #[must_use]
    pub const fn with_logging(mut self) -> Self {
        self.logging = Some(LogLevel::Info);
        self
    }

    /// Log each request at debug level, headers included.
    #[must_use]
    pub const fn with_debug_logging(mut self) -> Self {
        self.logging = Some(LogLevel::Debug);
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> ODataClient<HyperClient> {
        let session = self.session.unwrap_or_default();

        let mut transport = HyperClient::builder()
            .config(self.config.unwrap_or_default())
            .with_session(session.clone());
        if let Some(credential) = &self.credential {
            transport = transport.with_basic_auth(credential);
        }
        transport = match self.logging {
            Some(LogLevel::Info) => transport.with_logging(),
            Some(LogLevel::Debug) => transport.with_debug_logging(),
            None => transport,
        };

        let decoder = self
            .store
            .map_or_else(EntityDecoder::new, EntityDecoder::with_store);

        ODataClient::with_transport(transport.build(), session, decoder)
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use sapodata_core::MemoryStore;

    use super::*;

    #[test]
    fn builder_defaults() {
        let client = ODataClient::builder().build();
        check!(!client.is_persistent());
        check!(client.session().is_empty());
        check!(client.inner().config().timeout == std::time::Duration::from_secs(45));
    }

    #[test]
    fn builder_with_store_and_session() {
        let session = SessionStore::new();
        let client = ODataClient::builder()
            .persistent_store(MemoryStore::new())
            .session(session.clone())
            .build();

        check!(client.is_persistent());

        let url = "https://host/".parse().expect("url");
        session.store_cookies(
            &url,
            &sapodata_core::Response::new(
                200,
                [("set-cookie".to_string(), "a=1".to_string())].into(),
                Bytes::new(),
            ),
        );
        check!(client.session().cookie_count() == 1);
    }

    #[test]
    fn builder_debug_hides_password() {
        let builder = ODataClient::builder().credential(Credential::new("user", "hunter2"));
        let debug = format!("{builder:?}");
        check!(!debug.contains("hunter2"));
    }

    #[test]
    fn malformed_image_is_parsing_error() {
        let result = decode_image(b"not an image");
        check!(result.is_err_and(|err| err.is_parsing()));
    }
}
