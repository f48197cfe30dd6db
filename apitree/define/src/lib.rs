//! API Description Library
//!
//! This crate provides the normalized description of a REST API that the
//! `apitree` client builder consumes. An upstream parser (RAML, OpenAPI, or
//! anything else) is expected to reduce its input to these types; the crate
//! itself only knows how to decode them from JSON or YAML.
//!
//! ## Core Types
//!
//! - [`ApiDescription`] - Base URI, version, default media type and the resource tree
//! - [`Resource`] - A (possibly templated) path with methods and nested resources
//! - [`MethodDef`] - A declared HTTP method with its media types and parameters
//! - [`ParameterDef`] - A declared URI, query or header parameter
//! - [`RestMethod`] - HTTP verbs understood by the client
//!
//! ## Examples
//!
//! ```
//! use apitree_define::ApiDescription;
//!
//! let api = ApiDescription::from_yaml_str(
//!     r#"
//! title: Example
//! baseUri: http://example.com/{version}
//! version: v1
//! resources:
//!   - relativeUri: /users
//!     methods:
//!       - method: get
//!     resources:
//!       - relativeUri: /{userId}
//!         methods:
//!           - method: get
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(api.version.as_deref(), Some("v1"));
//! assert_eq!(api.resources[0].resources[0].relative_uri.as_deref(), Some("/{userId}"));
//! ```

pub mod description;
pub mod error;
pub mod method;

pub use description::{ApiDescription, MethodDef, ParameterDef, Resource};
pub use error::DefineError;
pub use method::RestMethod;
