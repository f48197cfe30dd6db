//! Structured response parse errors.

use thiserror::Error;

/// The parser that rejected a body.
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A response whose content type promised structure the body did not deliver.
///
/// The raw body, status and headers travel with the error for diagnostics.
#[derive(Debug, Error)]
#[error("Cannot parse {media_type} response (HTTP {status}): {source}")]
pub struct ResponseParseError {
    status: u16,
    headers: Vec<(String, String)>,
    media_type: String,
    raw: String,
    #[source]
    source: ParseFailure,
}

impl ResponseParseError {
    pub(crate) fn new(
        status: u16,
        headers: Vec<(String, String)>,
        media_type: impl Into<String>,
        raw: String,
        source: ParseFailure,
    ) -> Self {
        Self {
            status,
            headers,
            media_type: media_type.into(),
            raw,
            source,
        }
    }

    /// HTTP status of the response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers with lower-cased names.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The declared media type.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The body text that failed to parse.
    pub fn raw_body(&self) -> &str {
        &self.raw
    }

    /// The parser failure.
    pub fn failure(&self) -> &ParseFailure {
        &self.source
    }

    /// Consumes the error, returning the raw body.
    pub fn into_raw_body(self) -> String {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_raw_body() {
        let json_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = ResponseParseError::new(
            200,
            vec![("content-type".to_string(), "application/json".to_string())],
            "application/json",
            "nope".to_string(),
            json_err.into(),
        );

        assert_eq!(err.status(), 200);
        assert_eq!(err.raw_body(), "nope");
        assert!(matches!(err.failure(), ParseFailure::Json(_)));
        assert!(err.to_string().starts_with("Cannot parse application/json response (HTTP 200)"));
        assert_eq!(err.into_raw_body(), "nope");
    }
}
