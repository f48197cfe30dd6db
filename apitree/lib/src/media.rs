//! Media type classification.

use std::fmt;

/// How a body in a given content type is serialized or parsed.
///
/// ## Examples
///
/// ```
/// use apitree::MediaType;
///
/// assert_eq!(MediaType::parse("application/json; charset=utf-8"), MediaType::Json);
/// assert_eq!(MediaType::parse("application/vnd.api+json"), MediaType::Json);
/// assert_eq!(MediaType::parse("application/x-www-form-urlencoded"), MediaType::UrlEncoded);
/// assert!(matches!(MediaType::parse("text/html"), MediaType::Other(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    /// `application/json` and `*+json`.
    Json,
    /// `application/yaml`, `application/x-yaml`, `text/yaml` and `*+yaml`.
    Yaml,
    /// `application/x-www-form-urlencoded`.
    UrlEncoded,
    /// Anything else, kept as its lower-cased essence.
    Other(String),
}

impl MediaType {
    pub const JSON: &'static str = "application/json";
    pub const YAML: &'static str = "application/yaml";
    pub const URL_ENCODED: &'static str = "application/x-www-form-urlencoded";

    /// Classifies a `Content-Type` value, ignoring parameters and case.
    pub fn parse(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            Self::JSON => Self::Json,
            Self::URL_ENCODED => Self::UrlEncoded,
            Self::YAML | "application/x-yaml" | "text/yaml" | "text/x-yaml" => Self::Yaml,
            other if other.ends_with("+json") => Self::Json,
            other if other.ends_with("+yaml") => Self::Yaml,
            _ => Self::Other(essence),
        }
    }

    /// Returns `true` for formats parsed into a structure.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Json | Self::Yaml)
    }

    /// The canonical content type for this classification.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Json => Self::JSON,
            Self::Yaml => Self::YAML,
            Self::UrlEncoded => Self::URL_ENCODED,
            Self::Other(essence) => essence,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
