//! Error types for notelink.
//!
//! This module defines a unified error enum covering every failure category
//! in the application: configuration, I/O, the external backends, embedding
//! validation, the vector store, and note handling.

use thiserror::Error;

/// Unified error type for notelink.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors, including a missing API key. Raised before any
    /// network call is attempted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A backend signalled a rate limit (HTTP 429). The only error category
    /// the retry helper will retry.
    #[error("Backend rate limited: {0}")]
    RateLimited(String),

    /// A backend returned a non-rate-limit failure status or was unreachable.
    /// Not retried.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A backend response could not be parsed or violated its schema.
    /// Not retried.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// An embedding failed shape or bounds validation. Not retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Vector store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Note storage and rendering errors
    #[error("Note error: {0}")]
    Note(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error represents a transient rate-limit condition.
    ///
    /// The retry helper retries exactly this category; everything else
    /// propagates immediately.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::RateLimited(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedPayload(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_detection() {
        assert!(AppError::RateLimited("429".to_string()).is_rate_limited());
        assert!(!AppError::BackendUnavailable("503".to_string()).is_rate_limited());
        assert!(!AppError::Validation("bad".to_string()).is_rate_limited());
    }

    #[test]
    fn test_json_error_maps_to_malformed_payload() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let app: AppError = err.into();
        assert!(matches!(app, AppError::MalformedPayload(_)));
    }
}
