//! Error types for loading and saving model configurations.

use thiserror::Error;

/// Errors that can occur while reading or writing a configuration document.
///
/// Key-level problems (wrong value type, over-long sequences, a literal size next to a
/// contextual provider) are not errors: they fall back to defaults or are overridden
/// during resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be opened, read or written.
    #[error("Failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The document content is not well-formed JSON.
    #[error("Invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document is valid JSON but not a key-value object.
    #[error("Configuration document must be a JSON object, found {0}")]
    NotAnObject(String),
}

impl ConfigError {
    /// True for the parse family (malformed content or wrong top-level shape).
    pub fn is_parse(&self) -> bool {
        matches!(self, ConfigError::Parse(_) | ConfigError::NotAnObject(_))
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_not_parse() {
        let err: ConfigError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(!err.is_parse());
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_not_an_object_is_parse() {
        let err = ConfigError::NotAnObject("array".to_string());
        assert!(err.is_parse());
        assert_eq!(
            err.to_string(),
            "Configuration document must be a JSON object, found array"
        );
    }
}
