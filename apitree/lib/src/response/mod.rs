//! Response handling.
//!
//! The transport hands back a [`RawResponse`]; [`interpret`] turns it into
//! the caller-visible [`ApiResponse`], parsing structured bodies by content
//! type. Non-2xx statuses are ordinary results.

mod interpret;

use bytes::Bytes;
use serde_json::Value;

pub use interpret::interpret;

/// A response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header names as received.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// A response body after content-type interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed from a JSON content type.
    Json(Value),
    /// Parsed from a YAML content type.
    Yaml(Value),
    /// Any other content type, or an empty body.
    Text(String),
    /// A non-structured body that is not valid UTF-8.
    Binary(Vec<u8>),
}

impl ResponseBody {
    /// The parsed structure, for JSON and YAML bodies.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Json(value) | Self::Yaml(value) => Some(value),
            Self::Text(_) | Self::Binary(_) => None,
        }
    }

    /// The raw text, for text bodies.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// The result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: ResponseBody,
}

impl ApiResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Headers with lower-cased names, in received order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a header, by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Shorthand for [`ResponseBody::as_value`].
    pub fn json(&self) -> Option<&Value> {
        self.body.as_value()
    }

    /// Shorthand for [`ResponseBody::as_text`].
    pub fn text(&self) -> Option<&str> {
        self.body.as_text()
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }
}
