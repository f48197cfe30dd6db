//! Request composition.
//!
//! An invocation is merged from four layers, lowest first: declared
//! defaults, the client's configuration snapshot, the call-time
//! [`RequestOptions`], and the positional argument of the verb (a query for
//! `get`/`head`, a body for the others). The result is an immutable
//! [`RequestDescriptor`] handed to the transport.

mod body;
mod compose;
mod query;

use apitree_define::RestMethod;
use serde_json::{Map, Value};
use url::Url;

pub(crate) use compose::{Invocation, PathPiece};

/// Call-time overrides for one invocation.
///
/// ## Examples
///
/// ```
/// use apitree::RequestOptions;
/// use serde_json::json;
///
/// let options = RequestOptions::new()
///     .query("test=data")
///     .header("X-Test-Header", "Test")
///     .base_uri_parameter("zone", "apac");
///
/// assert_eq!(options.query, Some(json!("test=data")));
/// assert_eq!(options.headers.unwrap()["X-Test-Header"], json!("Test"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query as an encoded string or a mapping.
    pub query: Option<Value>,
    /// Body replacing the configured default. `Some(Value::Null)` sends no body.
    pub body: Option<Value>,
    /// Headers overriding configured headers by case-insensitive name.
    pub headers: Option<Map<String, Value>>,
    /// Values for unbound path variables and base URI variables.
    pub uri_parameters: Option<Map<String, Value>>,
    /// Values for base URI variables only.
    pub base_uri_parameters: Option<Map<String, Value>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the call-time query.
    pub fn query(mut self, query: impl Into<Value>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the call-time body.
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Adds one URI parameter.
    pub fn uri_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.uri_parameters
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Adds one base URI parameter.
    pub fn base_uri_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.base_uri_parameters
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }
}

/// A fully resolved request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: RestMethod,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl RequestDescriptor {
    /// Assembles a descriptor from already resolved parts.
    pub fn new(
        method: RestMethod,
        url: Url,
        headers: Vec<(String, String)>,
        body: Option<String>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    pub fn method(&self) -> RestMethod {
        self.method
    }

    /// The absolute URL, query included.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers in merge order, names as supplied.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The serialized body, if one is sent.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}
