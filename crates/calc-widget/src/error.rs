//! Error types for configuration and front-end wiring
//!
//! Edits never fail and evaluation failures are reported through
//! [`EvaluationError`](crate::service::EvaluationError), so this type only
//! covers the plumbing around the widget.

use thiserror::Error;

/// Result type for widget setup operations
pub type WidgetResult<T> = Result<T, WidgetError>;

/// Errors raised while configuring or mounting the widget
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Configuration value rejected
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A required element is missing from the page
    #[error("DOM error: {message}")]
    Dom {
        /// Error message
        message: String,
    },

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[cfg(feature = "native")]
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl WidgetError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a DOM error
    #[must_use]
    pub fn dom(message: impl Into<String>) -> Self {
        Self::Dom {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = WidgetError::config("endpoint must not be empty");
        assert_eq!(
            err.to_string(),
            "Configuration error: endpoint must not be empty"
        );
    }

    #[test]
    fn test_dom_error_display() {
        let err = WidgetError::dom("missing #expr");
        assert_eq!(err.to_string(), "DOM error: missing #expr");
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: WidgetError = json_err.into();
        assert!(err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = WidgetError::from(io);
        assert!(matches!(err, WidgetError::Io(_)));
    }
}
