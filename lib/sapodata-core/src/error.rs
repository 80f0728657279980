//! Error types for sapodata.
//!
//! [`Error`] is the closed set of outcomes a request can fail with. Each
//! kind of underlying failure maps to exactly one variant:
//!
//! | failure                         | variant                   |
//! |---------------------------------|---------------------------|
//! | transport ([`TransportError`])  | [`Error::RequestFailed`]  |
//! | HTTP 3xx                        | [`Error::Redirection`]    |
//! | HTTP 4xx                        | [`Error::Client`]         |
//! | HTTP 5xx                        | [`Error::Server`]         |
//! | any other status                | [`Error::Unknown`]        |
//! | body shape violation            | [`Error::Parsing`]        |
//! | store merge/commit failure      | [`Error::Persistence`]    |

use derive_more::{Display, Error, From};

use crate::{ErrorPayload, PersistenceError, Response};

// ============================================================================
// Transport Errors
// ============================================================================

/// Failure below HTTP: the request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum TransportError {
    /// Network/connection errors (DNS, refused, reset).
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// The configured request timeout elapsed.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// The request could not be built or serialized.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// The response body could not be read to the end.
    #[display("failed to read response body: {_0}")]
    #[from(skip)]
    Body(#[error(not(source))] String),
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for sapodata operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Transport-level failure (connectivity, TLS, timeout, bad request).
    #[display("request failed: {_0}")]
    #[from]
    RequestFailed(TransportError),

    /// 3xx response; the body was not decoded.
    #[display("unexpected redirection (HTTP {})", _0.status())]
    #[from(skip)]
    Redirection(#[error(not(source))] Response),

    /// 4xx response, with the server's error payload when it could be decoded.
    #[display("client error (HTTP {})", response.status())]
    #[from(skip)]
    Client {
        /// Raw response.
        response: Response,
        /// Structured SAP error, absent when the body did not conform.
        payload: Option<ErrorPayload>,
    },

    /// 5xx response.
    #[display("server error (HTTP {})", _0.status())]
    #[from(skip)]
    Server(#[error(not(source))] Response),

    /// Status outside every known range (1xx, >599).
    #[display("unclassifiable HTTP status {}", _0.status())]
    #[from(skip)]
    Unknown(#[error(not(source))] Response),

    /// A successful response whose body does not have the expected shape.
    #[display("parsing error at '{path}': {message}")]
    #[from(skip)]
    Parsing {
        /// Path to the offending element (e.g. `d.results[2].name`).
        path: String,
        /// Error message.
        message: String,
    },

    /// Decoded entities could not be merged into or committed to the store.
    #[display("persistence error: {_0}")]
    #[from]
    Persistence(PersistenceError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::RequestFailed(TransportError::InvalidUrl(err))
    }
}

impl Error {
    /// Create a parsing error with path context.
    #[must_use]
    pub fn parsing(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parsing {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestFailed(TransportError::Timeout))
    }

    /// Returns `true` if this is a parsing error.
    #[must_use]
    pub const fn is_parsing(&self) -> bool {
        matches!(self, Self::Parsing { .. })
    }

    /// Returns `true` if this is a persistence error.
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// The raw response, for the variants produced from an HTTP status.
    #[must_use]
    pub const fn response(&self) -> Option<&Response> {
        match self {
            Self::Redirection(response)
            | Self::Client { response, .. }
            | Self::Server(response)
            | Self::Unknown(response) => Some(response),
            _ => None,
        }
    }

    /// Returns the HTTP status code if the error came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.response().map(Response::status)
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Client { .. })
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Server(_))
    }

    /// The structured SAP error payload of a client error, if decoded.
    #[must_use]
    pub const fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            Self::Client { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}
