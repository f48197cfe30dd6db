//! Errors found while building a client from a description.

use apitree_define::DefineError;
use thiserror::Error;

use crate::template::TemplateError;

/// A malformed or unreadable API description.
///
/// These abort client creation; no partially built client is returned.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The description could not be fetched or read.
    #[error("Cannot read API description at {location}: {reason}")]
    Unreadable {
        /// File path or URL that was requested.
        location: String,
        /// Why reading failed.
        reason: String,
    },

    /// The description text did not decode.
    #[error(transparent)]
    Decode(#[from] DefineError),

    /// A resource has no relative URI.
    #[error("Resource under {parent} declares no path")]
    MissingPath {
        /// Path of the enclosing resource.
        parent: String,
    },

    /// A method has no verb.
    #[error("Method on {path} declares no HTTP verb")]
    MissingMethod {
        /// Path of the resource declaring the method.
        path: String,
    },

    /// A method verb is not a known HTTP method.
    #[error("Method on {path} has unknown HTTP verb {verb:?}")]
    InvalidMethod {
        /// Path of the resource declaring the method.
        path: String,
        /// The verb as written.
        verb: String,
    },

    /// The same verb is declared twice on one route.
    #[error("Method {method} declared twice on {path}")]
    DuplicateMethod {
        /// Route path.
        path: String,
        /// The repeated verb.
        method: String,
    },

    /// A path or base URI template is malformed.
    #[error("Invalid URI template {template:?}: {source}")]
    InvalidTemplate {
        /// The template text.
        template: String,
        /// What is wrong with it.
        #[source]
        source: TemplateError,
    },
}
