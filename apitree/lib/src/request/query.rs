//! Query string layering.
//!
//! Each layer is normalised to ordered fragments, one `key` or `key=value`
//! each, tagged with the decoded key. A higher layer removes every lower
//! fragment sharing one of its keys and appends its own, so repeated keys
//! within one layer keep their cardinality. Fragments of a pre-encoded string
//! are emitted exactly as written.

use serde_json::Value;
use url::form_urlencoded;

use crate::error::ComposeError;
use crate::template::render_scalar;

/// One `key` or `key=value` piece of a query string, already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment {
    key: String,
    encoded: String,
}

impl Fragment {
    fn raw(encoded: &str) -> Self {
        let key = form_urlencoded::parse(encoded.as_bytes())
            .next()
            .map(|(key, _)| key.into_owned())
            .unwrap_or_default();
        Self {
            key,
            encoded: encoded.to_string(),
        }
    }

    fn pair(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            encoded: form_urlencoded::Serializer::new(String::new())
                .append_pair(key, value)
                .finish(),
        }
    }
}

/// Ordered query fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct QueryPairs(Vec<Fragment>);

impl QueryPairs {
    /// Normalises one layer: an encoded string or a mapping.
    ///
    /// Arrays repeat their key, `null` entries are skipped and a `null` layer
    /// contributes nothing.
    pub(crate) fn from_value(value: &Value) -> Result<Self, ComposeError> {
        let mut fragments = Vec::new();
        match value {
            Value::Null => {}
            Value::String(encoded) => {
                let encoded = encoded.strip_prefix('?').unwrap_or(encoded);
                fragments.extend(
                    encoded
                        .split('&')
                        .filter(|fragment| !fragment.is_empty())
                        .map(Fragment::raw),
                );
            }
            Value::Object(map) => {
                for (key, value) in map {
                    match value {
                        Value::Array(items) => {
                            for item in items {
                                if let Some(text) = render_scalar(key, item)? {
                                    fragments.push(Fragment::pair(key, &text));
                                }
                            }
                        }
                        other => {
                            if let Some(text) = render_scalar(key, other)? {
                                fragments.push(Fragment::pair(key, &text));
                            }
                        }
                    }
                }
            }
            other => {
                return Err(ComposeError::InvalidQuery {
                    message: format!("expected an encoded string or an object, got {other}"),
                });
            }
        }
        Ok(Self(fragments))
    }

    /// Normalises declared `(name, default)` pairs.
    pub(crate) fn from_defaults(defaults: &[(String, Value)]) -> Result<Self, ComposeError> {
        let mut fragments = Vec::new();
        for (key, value) in defaults {
            if let Some(text) = render_scalar(key, value)? {
                fragments.push(Fragment::pair(key, &text));
            }
        }
        Ok(Self(fragments))
    }

    /// Applies a higher-precedence layer on top of this one.
    pub(crate) fn overlay(&mut self, higher: QueryPairs) {
        if higher.0.is_empty() {
            return;
        }
        self.0
            .retain(|lower| !higher.0.iter().any(|fragment| fragment.key == lower.key));
        self.0.extend(higher.0);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Joins the fragments, without a leading `?`.
    pub(crate) fn encode(&self) -> String {
        self.0
            .iter()
            .map(|fragment| fragment.encoded.as_str())
            .collect::<Vec<_>>()
            .join("&")
    }
}
