//! Description decoding errors.

use thiserror::Error;

/// Errors raised while decoding an [`ApiDescription`](crate::ApiDescription).
#[derive(Debug, Error)]
pub enum DefineError {
    /// The document is not a valid JSON description.
    #[error("JSON description error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not a valid YAML description.
    #[error("YAML description error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_display() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DefineError::from(err);
        assert!(err.to_string().starts_with("JSON description error"));
    }
}
