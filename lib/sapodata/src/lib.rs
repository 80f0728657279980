//! Typed async client for SAP OData v2 services.
//!
//! A request goes out through [`HyperClient`] (hyper + rustls, tower
//! middleware), the response is classified by status range, and a 2xx body is
//! unwrapped from the `{"d": ...}` envelope into your own `serde` types.
//!
//! # Example
//!
//! ```no_run
//! use sapodata::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct Category {
//!     #[serde(rename = "CategoryID")]
//!     id: u32,
//!     #[serde(rename = "CategoryName")]
//!     name: String,
//! }
//!
//! # async fn run() -> sapodata::Result<()> {
//! let client = ODataClient::builder().with_logging().build();
//!
//! match client
//!     .get_entity_set::<Category>("https://services.odata.org/V2/Northwind/Northwind.svc/Categories?$format=json")
//!     .await
//! {
//!     Ok(categories) => println!("{} categories", categories.len()),
//!     Err(Error::Client { payload: Some(payload), .. }) => {
//!         println!("{}: {}", payload.code(), payload.message());
//!     }
//!     Err(err) => return Err(err),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Sessions
//!
//! Cookies and `ETag`-validated responses live in a [`SessionStore`] handle.
//! [`ODataClient::logout`] clears it.
//!
//! # Persistence
//!
//! With [`ODataClientBuilder::persistent_store`], every decoded entity is
//! merged into a fresh [`PersistenceContext`] and committed before the call
//! returns. See [`MemoryStore`].

mod client;
mod config;
mod connector;
mod credential;
pub mod locale;
pub mod middleware;
mod odata_client;
pub mod prelude;
mod session;

pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, default_headers};
pub use credential::Credential;
pub use odata_client::{ODataClient, ODataClientBuilder};
pub use session::{DEFAULT_CACHE_CAPACITY, SessionStore};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use sapodata_core::{
    ClassifiedOutcome, EntityDecoder, EntityEnvelope, EntityKey, EntitySet, EntitySetEnvelope,
    Error, ErrorPayload, HttpClient, MemoryStore, MergePolicy, Method, PersistenceContext,
    PersistenceError, PersistentStore, Request, RequestBuilder, Response, Result, StatusClass,
    TransportError, classify, decode_many, decode_one, from_json, to_json,
};

// Re-export http types for status codes and headers
pub use sapodata_core::{StatusCode, header};

// Re-export crates that appear in the public API
pub use image;
pub use url;
