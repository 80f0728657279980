//! HTTP method types, including the OData v2 `MERGE` verb.

use derive_more::Display;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - read an entity or an entity set.
    #[display("GET")]
    Get,
    /// POST method - create an entity or call a function import.
    #[display("POST")]
    Post,
    /// PUT method - replace an entity.
    #[display("PUT")]
    Put,
    /// PATCH method - partially update an entity.
    #[display("PATCH")]
    Patch,
    /// MERGE method - OData v2 partial update.
    #[display("MERGE")]
    Merge,
    /// DELETE method - remove an entity.
    #[display("DELETE")]
    Delete,
    /// HEAD method - fetch headers only (e.g. a CSRF token).
    #[display("HEAD")]
    Head,
    /// OPTIONS method.
    #[display("OPTIONS")]
    Options,
}

impl Method {
    /// Returns `true` if the method does not modify resources.
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
            Method::Head => Self::HEAD,
            Method::Options => Self::OPTIONS,
            // Extension methods are valid tokens, so this cannot fail.
            Method::Merge => Self::from_bytes(b"MERGE").unwrap_or(Self::PATCH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Merge.to_string(), "MERGE");
    }

    #[test]
    fn merge_converts_to_extension_method() {
        let method = http::Method::from(Method::Merge);
        assert_eq!(method.as_str(), "MERGE");
    }

    #[test]
    fn safe_methods() {
        assert!(Method::Get.is_safe());
        assert!(Method::Head.is_safe());
        assert!(!Method::Merge.is_safe());
        assert!(!Method::Delete.is_safe());
    }
}
