//! Error types for the provider
//!
//! Provides unified error handling using thiserror.

use reqwest::StatusCode;
use thiserror::Error;

// == Provider Error Enum ==
/// Unified error type for resource operations and the HTTP client.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Building or decoding a JSON body failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The management API answered with a non-success status
    #[error("Request failed with status {status}: {message}")]
    Request { status: StatusCode, message: String },

    /// The request never produced a response (connect, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A resource identifier could not be decoded
    #[error("Invalid resource id: {0}")]
    InvalidId(String),

    /// Configuration failed schema validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource does not exist (import of a missing object)
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl ProviderError {
    /// Creates a Request error from a status code and response text.
    pub fn request(status: StatusCode, message: impl Into<String>) -> Self {
        ProviderError::Request {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProviderError::Request { status, .. } => Some(*status),
            ProviderError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Returns true for a 404 from the management API.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Returns true for a 409 from the management API.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }

    /// Returns true when retrying the same request may succeed.
    ///
    /// Covers throttling, a temporarily unavailable server, and requests
    /// that failed before reaching the server.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Request { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS
                    || *status == StatusCode::SERVICE_UNAVAILABLE
            }
            ProviderError::Transport(e) => e.is_connect(),
            _ => false,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = ProviderError::request(StatusCode::NOT_FOUND, "gone");
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_transient_statuses() {
        assert!(ProviderError::request(StatusCode::TOO_MANY_REQUESTS, "").is_transient());
        assert!(ProviderError::request(StatusCode::SERVICE_UNAVAILABLE, "").is_transient());
        assert!(!ProviderError::request(StatusCode::INTERNAL_SERVER_ERROR, "").is_transient());
        assert!(!ProviderError::InvalidId("x".to_string()).is_transient());
    }

    #[test]
    fn test_display_includes_status_and_body() {
        let err = ProviderError::request(StatusCode::BAD_REQUEST, "bad cache name");
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("bad cache name"));
    }

    #[test]
    fn test_serialization_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ProviderError = json_err.into();
        assert!(matches!(err, ProviderError::Serialization(_)));
        assert_eq!(err.status(), None);
    }
}
