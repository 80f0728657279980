//! Core types for the sapodata OData client.
//!
//! This crate holds everything that does not touch the network:
//! - [`Request`], [`Response`], [`Method`] - HTTP value types
//! - [`HttpClient`] - transport trait
//! - [`Error`], [`TransportError`] and [`Result`] - error taxonomy
//! - [`EntityEnvelope`], [`EntitySetEnvelope`], [`decode_one`], [`decode_many`] - the `d` / `d.results` envelope
//! - [`ErrorPayload`] - SAP Gateway error body, decoded best-effort
//! - [`classify`], [`ClassifiedOutcome`], [`StatusClass`] - status-range classification
//! - [`PersistentStore`], [`PersistenceContext`], [`MemoryStore`] - optional persistence
//! - [`EntityDecoder`] - envelope decoding with optional persistence

mod body;
mod classify;
mod client;
mod decoder;
mod envelope;
mod error;
mod error_payload;
mod method;
mod persistence;
pub mod prelude;
mod request;
mod response;

pub use body::{from_json, to_json};
pub use classify::{ClassifiedOutcome, StatusClass, classify};
pub use client::HttpClient;
pub use decoder::EntityDecoder;
pub use envelope::{EntityEnvelope, EntitySet, EntitySetEnvelope, decode_many, decode_one};
pub use error::{Error, Result, TransportError};
pub use error_payload::{
    ErrorApplication, ErrorDetail, ErrorMessage, ErrorPayload, ErrorResolution, InnerError,
    ODataError,
};
pub use method::Method;
pub use persistence::{
    EntityKey, MemoryStore, MergePolicy, PersistenceContext, PersistenceError, PersistentStore,
};
pub use request::{Request, RequestBuilder};
pub use response::{Response, SET_COOKIE_SEPARATOR};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
