//! Tower middleware layers for the OData transport.
//!
//! Layers wrap the raw hyper client; the last layer added is the first to
//! process requests. [`crate::ODataClientBuilder`] stacks them as
//! `logging -> basic auth -> session -> hyper`, so a replayed challenge goes
//! through the session layer again and carries the session cookies.
//!
//! - [`SessionLayer`] - Cookies and `ETag` revalidation from a [`crate::SessionStore`]
//! - [`BasicAuthLayer`] - Answers `WWW-Authenticate: Basic` challenges once
//! - [`LoggingLayer`] - One `odata_request` span per exchange

mod basic_auth;
mod logging;
mod session;

pub use basic_auth::{BasicAuth, BasicAuthLayer};
pub use logging::{LogLevel, Logging, LoggingLayer};
pub use session::{Session, SessionLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
