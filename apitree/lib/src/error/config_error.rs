//! Client configuration errors.

use thiserror::Error;

use crate::config::ConfigKey;

/// A rejected configuration operation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The key is not one of the known option keys.
    #[error("Unknown configuration key: {key}")]
    UnknownKey {
        /// The key as given.
        key: String,
    },

    /// The value has the wrong shape for its key.
    #[error("Invalid value for {key}: expected {expected}")]
    InvalidValue {
        /// The key being set.
        key: ConfigKey,
        /// Description of the accepted shapes.
        expected: &'static str,
    },

    /// A bulk update was not a mapping.
    #[error("Bulk configuration must be an object")]
    NotAnObject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            key: ConfigKey::Headers,
            expected: "an object",
        };
        assert_eq!(err.to_string(), "Invalid value for headers: expected an object");
    }

    #[test]
    fn test_unknown_key_display() {
        let err = ConfigError::UnknownKey {
            key: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown configuration key: timeout");
    }
}
