//! Response classification by status-code range.
//!
//! | status      | outcome                                   |
//! |-------------|-------------------------------------------|
//! | `200..=299` | body decoded -> [`ClassifiedOutcome::Decoded`] |
//! | `300..=399` | [`ClassifiedOutcome::Redirection`]        |
//! | `400..=499` | [`ClassifiedOutcome::ClientError`], with a best-effort [`ErrorPayload`] |
//! | `500..=599` | [`ClassifiedOutcome::ServerError`]        |
//! | anything else | [`ClassifiedOutcome::Unknown`]          |
//!
//! A decode failure on a 2xx response is returned as an error of its own
//! ([`Error::Parsing`] or [`Error::Persistence`]); it is never folded into the
//! client/server buckets.

use derive_more::Display;
use tracing::debug;

use crate::{Error, ErrorPayload, Response, Result};

/// Status-code range of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StatusClass {
    /// 2xx.
    #[display("success")]
    Success,
    /// 3xx.
    #[display("redirection")]
    Redirection,
    /// 4xx.
    #[display("client error")]
    ClientError,
    /// 5xx.
    #[display("server error")]
    ServerError,
    /// Outside every range above.
    #[display("unknown")]
    Unknown,
}

impl StatusClass {
    /// Class of a status code.
    #[must_use]
    pub const fn of(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            300..=399 => Self::Redirection,
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Result of classifying one response.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedOutcome<T> {
    /// 2xx with a successfully decoded body.
    Decoded(T),
    /// 3xx; the body was not decoded.
    Redirection(Response),
    /// 4xx.
    ClientError {
        /// Raw response.
        response: Response,
        /// Structured SAP error, absent when the body did not conform.
        payload: Option<ErrorPayload>,
    },
    /// 5xx.
    ServerError(Response),
    /// Any other status.
    Unknown(Response),
}

impl<T> ClassifiedOutcome<T> {
    /// The status class of this outcome.
    #[must_use]
    pub const fn class(&self) -> StatusClass {
        match self {
            Self::Decoded(_) => StatusClass::Success,
            Self::Redirection(_) => StatusClass::Redirection,
            Self::ClientError { .. } => StatusClass::ClientError,
            Self::ServerError(_) => StatusClass::ServerError,
            Self::Unknown(_) => StatusClass::Unknown,
        }
    }

    /// Returns `true` for [`ClassifiedOutcome::Decoded`].
    #[must_use]
    pub const fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }

    /// Turn the outcome into the decoded value or the matching [`Error`].
    ///
    /// # Errors
    ///
    /// Every non-decoded outcome maps to its [`Error`] variant.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Decoded(value) => Ok(value),
            Self::Redirection(response) => Err(Error::Redirection(response)),
            Self::ClientError { response, payload } => Err(Error::Client { response, payload }),
            Self::ServerError(response) => Err(Error::Server(response)),
            Self::Unknown(response) => Err(Error::Unknown(response)),
        }
    }
}

/// Classify `response`, decoding its body with `decode` on success.
///
/// # Errors
///
/// Only errors returned by `decode` (for a 2xx response) are propagated;
/// every other status produces an `Ok` outcome.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use bytes::Bytes;
/// use sapodata_core::{ClassifiedOutcome, Response, classify, decode_one};
///
/// let response = Response::new(201, HashMap::new(), Bytes::from(r#"{"d":"42"}"#));
/// let outcome = classify(response, decode_one::<String>).unwrap();
/// assert_eq!(outcome, ClassifiedOutcome::Decoded("42".to_string()));
/// ```
pub fn classify<T, F>(response: Response, decode: F) -> Result<ClassifiedOutcome<T>>
where
    F: FnOnce(&[u8]) -> Result<T>,
{
    let class = response.status_class();
    debug!(status = response.status(), %class, "classified response");

    let outcome = match class {
        StatusClass::Success => ClassifiedOutcome::Decoded(decode(response.body())?),
        StatusClass::Redirection => ClassifiedOutcome::Redirection(response),
        StatusClass::ClientError => {
            let payload = ErrorPayload::from_body(response.body());
            ClassifiedOutcome::ClientError { response, payload }
        }
        StatusClass::ServerError => ClassifiedOutcome::ServerError(response),
        StatusClass::Unknown => ClassifiedOutcome::Unknown(response),
    };

    Ok(outcome)
}
