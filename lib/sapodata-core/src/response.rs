//! HTTP response handling.
//!
//! [`Response`] is the raw `(status, headers, body)` triple handed to the
//! classifier. Error outcomes carry it unchanged so callers can inspect what
//! the server actually sent.

use std::collections::HashMap;

use bytes::Bytes;

use crate::StatusClass;

/// Separator used when several `Set-Cookie` headers are folded into one entry.
///
/// A newline can never appear inside a header value, so it splits back
/// unambiguously (unlike `,` which occurs in cookie `Expires` dates).
pub const SET_COOKIE_SEPARATOR: char = '\n';

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response. Header names are stored lowercase.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Status range this response falls in.
    #[must_use]
    pub const fn status_class(&self) -> StatusClass {
        StatusClass::of(self.status)
    }

    /// Response headers, keyed by lowercase name.
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

    /// Every `Set-Cookie` value the server sent.
    pub fn set_cookies(&self) -> impl Iterator<Item = &str> {
        self.header("set-cookie")
            .into_iter()
            .flat_map(|value| value.split(SET_COOKIE_SEPARATOR))
            .filter(|value| !value.trim().is_empty())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, B) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status_class(), StatusClass::Success)
    }

    /// Returns a copy of this response with another status code.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

impl Response<Bytes> {
    /// Get the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_basic() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let response = Response::new(200, headers, Bytes::from(r#"{"d":{}}"#));

        assert_eq!(response.status(), 200);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert!(response.is_success());
        assert_eq!(response.status_class(), StatusClass::Success);
    }

    #[test]
    fn response_status_class() {
        let response = Response::new(302, HashMap::new(), Bytes::new());
        assert_eq!(response.status_class(), StatusClass::Redirection);

        let response = Response::new(404, HashMap::new(), Bytes::new());
        assert_eq!(response.status_class(), StatusClass::ClientError);

        let response = Response::new(503, HashMap::new(), Bytes::new());
        assert_eq!(response.status_class(), StatusClass::ServerError);
    }

    #[test]
    fn set_cookies_are_split() {
        let headers = HashMap::from([(
            "set-cookie".to_string(),
            "SAP_SESSIONID=abc; path=/\nsap-usercontext=sap-client=100; path=/".to_string(),
        )]);
        let response = Response::new(200, headers, Bytes::new());

        let cookies: Vec<_> = response.set_cookies().collect();
        assert_eq!(
            cookies,
            vec![
                "SAP_SESSIONID=abc; path=/",
                "sap-usercontext=sap-client=100; path=/"
            ]
        );
    }

    #[test]
    fn response_text() {
        let response = Response::new(200, HashMap::new(), Bytes::from("Hello"));
        assert_eq!(response.text().expect("text"), "Hello");
    }
}
