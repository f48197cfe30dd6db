//! The normalized API description tree.
//!
//! Field names follow the camelCase convention of the documents they are
//! decoded from (`baseUri`, `relativeUri`, `queryParameters`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DefineError;

/// A complete API description.
///
/// Only `resources` is structurally required; everything else may be absent.
/// Verb and path validity are checked by the client builder rather than here so
/// that a malformed description fails with a build error naming the resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDescription {
    /// Human-readable API title.
    #[serde(default)]
    pub title: Option<String>,
    /// Base URI template, e.g. `http://{zone}.example.com/{version}`.
    #[serde(default)]
    pub base_uri: Option<String>,
    /// API version substituted into `{version}` when the client is built.
    #[serde(default)]
    pub version: Option<String>,
    /// Default media type for request bodies.
    #[serde(default)]
    pub media_type: Option<String>,
    /// Declared base URI parameters.
    #[serde(default)]
    pub base_uri_parameters: BTreeMap<String, ParameterDef>,
    /// Top-level resources in declaration order.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl ApiDescription {
    /// Decodes a description from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, DefineError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decodes a description from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, DefineError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Decodes a description of unknown format.
    ///
    /// JSON documents are tried first; anything else is decoded as YAML.
    pub fn parse(text: &str) -> Result<Self, DefineError> {
        if text.trim_start().starts_with('{') {
            Self::from_json_str(text)
        } else {
            Self::from_yaml_str(text)
        }
    }
}

/// A resource: one relative URI with its methods and nested resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Path relative to the parent, e.g. `/users`, `/{userId}` or `/mixed{a}{b}`.
    #[serde(default)]
    pub relative_uri: Option<String>,
    /// Optional display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Declarations for the variables appearing in `relative_uri`.
    #[serde(default)]
    pub uri_parameters: BTreeMap<String, ParameterDef>,
    /// Declared methods in declaration order.
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    /// Nested resources in declaration order.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// A declared HTTP method on a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDef {
    /// The verb, e.g. `get`. Validated at build time.
    #[serde(default)]
    pub method: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Accepted request media types, most preferred first.
    #[serde(default)]
    pub body: Vec<String>,
    /// Media types the method responds with.
    #[serde(default)]
    pub responses: Vec<String>,
    /// Declared query string parameters.
    #[serde(default)]
    pub query_parameters: BTreeMap<String, ParameterDef>,
    /// Declared request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, ParameterDef>,
}

/// A declared parameter (URI, base URI, query or header).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Value used when the caller supplies none.
    #[serde(default)]
    pub default: Option<Value>,
    /// Allowed values.
    #[serde(default, rename = "enum")]
    pub enum_values: Vec<Value>,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: Option<bool>,
}

impl ParameterDef {
    /// The value to use when nothing else supplies one.
    ///
    /// This is the declared `default`, or the only member of a single-value
    /// `enum`.
    ///
    /// ## Examples
    ///
    /// ```
    /// use apitree_define::ParameterDef;
    /// use serde_json::json;
    ///
    /// let param = ParameterDef { enum_values: vec![json!("value")], ..Default::default() };
    /// assert_eq!(param.implicit_value(), Some(&json!("value")));
    /// ```
    pub fn implicit_value(&self) -> Option<&Value> {
        match (&self.default, self.enum_values.as_slice()) {
            (Some(value), _) => Some(value),
            (None, [only]) => Some(only),
            _ => None,
        }
    }
}
