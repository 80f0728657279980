//! Prelude module for convenient imports.
//!
//! ```ignore
//! use sapodata_core::prelude::*;
//! ```

pub use crate::{
    ClassifiedOutcome, EntityDecoder, Error, ErrorPayload, HttpClient, MemoryStore, Method,
    PersistentStore, Request, RequestBuilder, Response, Result, StatusClass, classify,
    decode_many, decode_one,
};
