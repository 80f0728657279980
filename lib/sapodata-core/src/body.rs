//! JSON body helpers.

use bytes::Bytes;

use crate::{Error, Result, TransportError};

/// Serialize a value to JSON bytes for a request body.
///
/// # Errors
///
/// Returns [`Error::RequestFailed`] with [`TransportError::InvalidRequest`]
/// if serialization fails: the request cannot be sent.
///
/// # Example
///
/// ```
/// use sapodata_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Product { name: String }
///
/// let product = Product { name: "Widget".to_string() };
/// let bytes = to_json(&product).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Widget"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| Error::RequestFailed(TransportError::InvalidRequest(e.to_string())))
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so that the resulting [`Error::Parsing`] names
/// the exact element that failed (e.g. `d.results[0].Price`).
///
/// # Errors
///
/// Returns [`Error::Parsing`] if the bytes are not JSON or do not match `T`.
///
/// # Example
///
/// ```
/// use sapodata_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Product { name: String }
///
/// let product: Product = from_json(br#"{"name":"Widget"}"#).expect("deserialize");
/// assert_eq!(product, Product { name: "Widget".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| Error::parsing(e.path().to_string(), e.inner().to_string()))?;
    deserializer
        .end()
        .map_err(|e| Error::parsing(".", e.to_string()))?;
    Ok(value)
}
