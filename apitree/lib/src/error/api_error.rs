//! Top-level API error type.

use super::{ComposeError, ConfigError, ResponseParseError, SpecError, TransportError};
use thiserror::Error;

/// Top-level error type for all client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use apitree::ApiError;
///
/// fn handle_error(err: ApiError) {
///     match err {
///         ApiError::Spec(e) => eprintln!("Bad description: {e}"),
///         ApiError::Compose(e) => eprintln!("Bad invocation: {e}"),
///         ApiError::Transport(e) => eprintln!("Network error: {e}"),
///         ApiError::ResponseParse(e) => eprintln!("Unparseable body: {}", e.raw_body()),
///         ApiError::Config(e) => eprintln!("Configuration error: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API description could not be turned into a client.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// The invocation could not be composed into a request.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// The transport failed to deliver the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response declared a structured body that did not parse.
    #[error(transparent)]
    ResponseParse(#[from] ResponseParseError),

    /// A configuration value was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_compose_error() {
        let err: ApiError = ComposeError::UnresolvedVariable {
            name: "zone".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::Compose(_)));
        assert_eq!(err.to_string(), "Unresolved URI variable: zone");
    }

    #[test]
    fn test_from_spec_error() {
        let err: ApiError = SpecError::MissingPath {
            parent: "/".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::Spec(_)));
    }

    #[test]
    fn test_from_transport_error() {
        let err: ApiError = TransportError::Connection("refused".to_string()).into();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(err.to_string().contains("refused"));
    }
}
