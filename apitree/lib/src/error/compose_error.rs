//! Errors composing a single invocation into a request.

use thiserror::Error;

use crate::template::TemplateError;

/// An invocation that cannot be turned into a request.
///
/// Only the invocation that raised it fails; the client stays usable.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A path or base URI variable has no value in any layer.
    #[error("Unresolved URI variable: {name}")]
    UnresolvedVariable {
        /// The variable name.
        name: String,
    },

    /// The route does not declare the requested method.
    #[error("Method {method} is not declared on {path}")]
    MethodNotAllowed {
        /// Requested verb.
        method: String,
        /// Route template.
        path: String,
    },

    /// The property has no templated route to invoke.
    #[error("Route {property:?} cannot be called with arguments")]
    NotCallable {
        /// The property that was invoked.
        property: String,
    },

    /// More positional arguments than the route has variables.
    #[error("Route {property:?} takes {expected} argument(s), got {given}")]
    TooManyArguments {
        /// The property that was invoked.
        property: String,
        /// Number of variables in the route segment.
        expected: usize,
        /// Number of arguments supplied.
        given: usize,
    },

    /// A query value is neither an encoded string nor a mapping.
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// What was wrong.
        message: String,
    },

    /// A parameter or header value cannot be rendered as text.
    #[error("Invalid value for {name}: {message}")]
    InvalidParameter {
        /// Parameter or header name.
        name: String,
        /// What was wrong.
        message: String,
    },

    /// The composed URL does not parse.
    #[error("Invalid request URL {url:?}: {source}")]
    InvalidUrl {
        /// The composed URL text.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },

    /// A JSON body could not be serialized.
    #[error("Cannot serialize JSON body: {0}")]
    SerializeJson(#[from] serde_json::Error),

    /// A YAML body could not be serialized.
    #[error("Cannot serialize YAML body: {0}")]
    SerializeYaml(#[from] serde_yaml::Error),

    /// A structured body was given for a media type that has no structure.
    #[error("Cannot send a structured body as {media_type}")]
    UnsupportedBody {
        /// The negotiated content type.
        media_type: String,
    },

    /// A root-call path template is malformed.
    #[error("Invalid path template: {0}")]
    InvalidTemplate(#[from] TemplateError),
}

impl ComposeError {
    pub(crate) fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }
}
