//! URI template parsing and expansion.
//!
//! Templates are literal text interleaved with `{name}` placeholders. A path
//! segment such as `mixed{a}{b}` expands by plain concatenation of its parts:
//! no delimiter is ever inserted between adjacent variables.

use std::mem;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::ComposeError;

/// Characters left as-is when a variable value is placed into a path.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Template syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `{` without a matching `}`.
    #[error("unclosed '{{' at offset {offset}")]
    Unclosed {
        /// Byte offset of the opening brace.
        offset: usize,
    },

    /// A `}` without a preceding `{`.
    #[error("unexpected '}}' at offset {offset}")]
    UnexpectedClose {
        /// Byte offset of the brace.
        offset: usize,
    },

    /// A `{` inside a placeholder.
    #[error("nested '{{' at offset {offset}")]
    Nested {
        /// Byte offset of the inner brace.
        offset: usize,
    },

    /// A `{}` placeholder with no name.
    #[error("empty variable name at offset {offset}")]
    EmptyName {
        /// Byte offset of the opening brace.
        offset: usize,
    },
}

/// One piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Text copied verbatim.
    Literal(String),
    /// A named placeholder.
    Variable(String),
}

/// A parsed URI template.
///
/// ## Examples
///
/// ```
/// use apitree::template::PathTemplate;
///
/// let template = PathTemplate::parse("mixed{a}{b}").unwrap();
/// assert_eq!(template.property_name(), "mixed");
/// assert_eq!(template.variables().collect::<Vec<_>>(), vec!["a", "b"]);
///
/// let path = template
///     .expand(|name| Some(if name == "a" { "123" } else { "456" }.to_string()))
///     .unwrap();
/// assert_eq!(path, "mixed123456");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    parts: Vec<TemplatePart>,
}

impl PathTemplate {
    /// Parses template text into ordered literal and variable parts.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (inner, c) in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(TemplateError::Nested { offset: inner }),
                            _ => name.push(c),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed { offset });
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TemplateError::EmptyName { offset });
                    }
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(mem::take(&mut literal)));
                    }
                    parts.push(TemplatePart::Variable(name.to_string()));
                }
                '}' => return Err(TemplateError::UnexpectedClose { offset }),
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Ok(Self {
            source: text.to_string(),
            parts,
        })
    }

    /// The template text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parts in declaration order.
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Variable names in declaration order, repeats included.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Variable(name) => Some(name.as_str()),
            TemplatePart::Literal(_) => None,
        })
    }

    /// Returns `true` when the template has no placeholders.
    pub fn is_literal(&self) -> bool {
        self.variables().next().is_none()
    }

    /// The name under which this segment is exposed as a property.
    ///
    /// This is the leading literal text, or the first variable name when the
    /// segment starts with a placeholder. The result need not be a valid
    /// identifier (`~{id}` is exposed as `~`).
    pub fn property_name(&self) -> &str {
        match self.parts.first() {
            Some(TemplatePart::Literal(text)) => text,
            Some(TemplatePart::Variable(name)) => name,
            None => "",
        }
    }

    /// Expands the template, percent-encoding every substituted value.
    ///
    /// ## Errors
    ///
    /// Returns [`ComposeError::UnresolvedVariable`] for the first variable the
    /// lookup has no value for.
    pub fn expand<F>(&self, mut lookup: F) -> Result<String, ComposeError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Variable(name) => {
                    let value = lookup(name).ok_or_else(|| ComposeError::UnresolvedVariable {
                        name: name.clone(),
                    })?;
                    out.push_str(&encode_segment(&value));
                }
            }
        }
        Ok(out)
    }
}

/// Expands `{variable}` placeholders in `template` from a parameter map.
///
/// ## Examples
///
/// ```
/// use apitree::template::expand;
/// use serde_json::json;
///
/// let params = json!({ "test": "here", "variable": 42 });
/// let path = expand("/{test}/{variable}/{test}", params.as_object().unwrap()).unwrap();
/// assert_eq!(path, "/here/42/here");
/// ```
pub fn expand(template: &str, params: &Map<String, Value>) -> Result<String, ComposeError> {
    let template = PathTemplate::parse(template)?;
    let mut failure = None;
    let expanded = template.expand(|name| match params.get(name) {
        Some(value) => match render_scalar(name, value) {
            Ok(text) => text,
            Err(err) => {
                failure.get_or_insert(err);
                None
            }
        },
        None => None,
    });
    match failure {
        Some(err) => Err(err),
        None => expanded,
    }
}

/// Percent-encodes a value for use inside a path segment.
pub fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Renders a scalar JSON value as text.
///
/// `null` is absence; arrays and objects have no single textual form.
pub(crate) fn render_scalar(name: &str, value: &Value) -> Result<Option<String>, ComposeError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Array(_) | Value::Object(_) => Err(ComposeError::invalid_parameter(
            name,
            "expected a string, number or boolean",
        )),
    }
}
