//! Custom error types for translation operations

use std::fmt;
use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Backend artifact missing or unloadable, or invalid settings
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Language code the backend cannot serve
    #[error("Unsupported language: {code}")]
    UnsupportedLanguage {
        code: String,
    },

    /// Backend failed during generation/decoding
    #[error("Inference error: {message}")]
    InferenceError {
        message: String,
    },

    /// Backend call exceeded the configured deadline
    #[error("Translation timeout after {timeout_ms}ms")]
    TimeoutError {
        timeout_ms: u64,
    },

    /// Backend answered with something we cannot use
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Malformed caller input
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Coarse failure classes the façade reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Backend could not be constructed
    Configuration,
    /// Code the backend does not know
    UnsupportedLanguage,
    /// Anything that went wrong while running the model
    Inference,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::UnsupportedLanguage => write!(f, "unsupported_language"),
            ErrorKind::Inference => write!(f, "inference"),
        }
    }
}

impl BridgeError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::ConfigError { .. } | BridgeError::InvalidInput { .. } => {
                ErrorKind::Configuration
            }
            BridgeError::UnsupportedLanguage { .. } => ErrorKind::UnsupportedLanguage,
            _ => ErrorKind::Inference,
        }
    }

    /// Whether another attempt against the same backend may succeed
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Inference
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        BridgeError::ConfigError {
            message: message.into(),
        }
    }

    pub(crate) fn inference(message: impl Into<String>) -> Self {
        BridgeError::InferenceError {
            message: message.into(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, BridgeError>;
