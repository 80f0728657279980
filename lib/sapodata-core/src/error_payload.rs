//! SAP Gateway error bodies.
//!
//! ```json
//! {"error": {"code": "...", "message": {"lang": "en", "value": "..."},
//!   "innererror": {"application": {...}, "transactionid": "...",
//!     "timestamp": "...", "Error_Resolution": {...}, "errordetails": [...]}}}
//! ```
//!
//! Decoding is best-effort: servers (and proxies in front of them) do not
//! always send this shape, so [`ErrorPayload::from_body`] yields `None`
//! instead of failing.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Root of an SAP error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// The error description.
    pub error: ODataError,
}

/// Error description: code, localized message and inner details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataError {
    /// Message class and number, e.g. `"/IWBEP/CM_MGW_RT/020"`.
    pub code: String,
    /// Localized message.
    pub message: ErrorMessage,
    /// Gateway diagnostics.
    #[serde(rename = "innererror")]
    pub inner: InnerError,
}

/// Localized message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Language tag of `value`.
    #[serde(rename = "lang")]
    pub language: String,
    /// Message text.
    pub value: String,
}

/// Gateway diagnostics attached to an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerError {
    /// The service that raised the error.
    pub application: ErrorApplication,
    /// Gateway transaction id, for correlating with `/IWFND/ERROR_LOG`.
    #[serde(rename = "transactionid")]
    pub transaction_id: String,
    /// Server timestamp.
    pub timestamp: String,
    /// Where to look next.
    #[serde(rename = "Error_Resolution")]
    pub resolution: ErrorResolution,
    /// Field-level messages, in server order.
    #[serde(rename = "errordetails")]
    pub details: Vec<ErrorDetail>,
}

/// Identity of the service that raised the error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorApplication {
    /// Application component.
    pub component_id: String,
    /// Service namespace.
    pub service_namespace: String,
    /// Service id.
    pub service_id: String,
    /// Service version.
    pub service_version: String,
}

/// Resolution hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResolution {
    /// Transaction to analyse the error in.
    #[serde(rename = "SAP_Transaction")]
    pub transaction: String,
    /// SAP note reference.
    #[serde(rename = "SAP_Note")]
    pub note: String,
}

/// One field-level message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Message code.
    pub code: String,
    /// Message text.
    pub message: String,
    /// Property the message refers to.
    #[serde(rename = "propertyref")]
    pub property_ref: String,
    /// `error`, `warning`, `info`, ...
    pub severity: String,
    /// Whether the message is transient.
    pub transition: bool,
    /// Target field name.
    pub target: String,
}

impl ErrorPayload {
    /// Best-effort decode of an error body.
    ///
    /// Any failure (not JSON, missing field, wrong type) is logged at
    /// `debug` and turned into `None`.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Option<Self> {
        match serde_json::from_slice(body) {
            Ok(payload) => Some(payload),
            Err(err) => {
                debug!(error = %err, "error body is not an SAP error payload");
                None
            }
        }
    }

    /// Error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.error.code
    }

    /// Localized message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.error.message.value
    }
}
