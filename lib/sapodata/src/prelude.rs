//! Prelude module for convenient imports.
//!
//! ```ignore
//! use sapodata::prelude::*;
//! ```

pub use crate::{
    ClientConfig, Credential, Error, ErrorPayload, HttpClient, HyperClient, MemoryStore, Method,
    ODataClient, PersistentStore, Request, RequestBuilder, Response, Result, SessionStore,
    StatusCode,
};
pub use serde::{Deserialize, Serialize};
