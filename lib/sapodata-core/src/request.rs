//! HTTP request building.
//!
//! Use [`Request::builder`] (or [`Request::get`]) to construct requests.
//! Header names are stored lowercase, so lookups are case-insensitive.
//!
//! # Example
//!
//! ```
//! use sapodata_core::{Request, Method};
//! use bytes::Bytes;
//!
//! let url = "https://host/sap/opu/odata/sap/ZSRV/Products".parse().unwrap();
//! let request = Request::<Bytes>::builder(Method::Get, url)
//!     .header("sap-client", "100")
//!     .build();
//! assert_eq!(request.header("SAP-Client"), Some("100"));
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::Method;

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// Creates a bodyless `GET` request.
    #[must_use]
    pub fn get(url: url::Url) -> Self {
        RequestBuilder::new(Method::Get, url).build()
    }

    /// Creates a request from its parts.
    #[must_use]
    pub fn from_parts(
        method: Method,
        url: url::Url,
        headers: HashMap<String, String>,
        body: Option<B>,
    ) -> Self {
        Self {
            method,
            url,
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
            body,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers, keyed by lowercase name.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Sets a header only when the request does not carry it yet.
    pub fn set_default_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    /// Removes a header, returning its value.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&name.to_ascii_lowercase())
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HashMap<String, String>, Option<B>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets multiple headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(
            headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value)),
        );
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl RequestBuilder<Bytes> {
    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Parsing`] if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self.header("Content-Type", "application/json").body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> url::Url {
        url::Url::parse("https://host/sap/opu/odata/sap/ZSRV/Products").expect("valid URL")
    }

    #[test]
    fn request_builder_basic() {
        let request = Request::<Bytes>::builder(Method::Get, url())
            .header("Accept", "application/json")
            .build();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(
            request.url().as_str(),
            "https://host/sap/opu/odata/sap/ZSRV/Products"
        );
        assert_eq!(request.header("accept"), Some("application/json"));
        assert!(request.body().is_none());
    }

    #[test]
    fn default_header_does_not_override() {
        let mut request = Request::<Bytes>::builder(Method::Get, url())
            .header("SAP-Language", "DE")
            .build();

        request.set_default_header("sap-language", "EN");
        request.set_default_header("Accept", "application/json");

        assert_eq!(request.header("sap-language"), Some("DE"));
        assert_eq!(request.header("accept"), Some("application/json"));
    }

    #[test]
    fn from_parts_lowercases_names() {
        let headers = HashMap::from([("X-CSRF-Token".to_string(), "Fetch".to_string())]);
        let request = Request::<Bytes>::from_parts(Method::Head, url(), headers, None);
        assert_eq!(request.headers().get("x-csrf-token").map(String::as_str), Some("Fetch"));
    }

    #[test]
    fn request_builder_json() {
        #[derive(serde::Serialize)]
        struct Product {
            name: String,
        }

        let request = Request::builder(Method::Merge, url())
            .json(&Product {
                name: "Widget".to_string(),
            })
            .expect("json")
            .build();

        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(
            request.body().map(Bytes::as_ref),
            Some(br#"{"name":"Widget"}"#.as_slice())
        );
    }
}
