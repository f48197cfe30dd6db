//! Layered error types for the client.
//!
//! Every failure is returned to the caller of the operation that hit it:
//! - [`ApiError`] - Top-level error type for all client operations
//! - [`SpecError`] - Malformed or unreadable API description (client creation)
//! - [`ComposeError`] - A single invocation could not be turned into a request
//! - [`TransportError`] - Network or protocol failure while sending
//! - [`ResponseParseError`] - A structured response body did not parse
//! - [`ConfigError`] - Invalid client configuration value

mod api_error;
mod compose_error;
mod config_error;
mod response_error;
mod spec_error;
mod transport_error;

pub use api_error::ApiError;
pub use compose_error::ComposeError;
pub use config_error::ConfigError;
pub use response_error::{ParseFailure, ResponseParseError};
pub use spec_error::SpecError;
pub use transport_error::TransportError;
