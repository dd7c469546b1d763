//! Error types for the GoBarber client
//!
//! Two kinds matter to the scheduling flow: local validation failures and
//! remote operation failures. Everything else is plumbing around them.

use thiserror::Error;

/// Main error type for the GoBarber client
#[derive(Error, Debug)]
pub enum GoBarberError {
    /// Local precondition failures (no provider, no hour, hour not bookable)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any failure from a call to the remote API
    #[error("Remote operation '{operation}' failed: {message}")]
    RemoteOperation { operation: String, message: String },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors with context
    #[error("GoBarber error: {0}")]
    Generic(String),
}

impl GoBarberError {
    /// Build a remote operation error
    pub fn remote(operation: &str, message: impl Into<String>) -> Self {
        GoBarberError::RemoteOperation {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Whether the failure came from the network side and can be retried by the user
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            GoBarberError::RemoteOperation { .. } | GoBarberError::Http(_)
        )
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, GoBarberError>;

/// Convert anyhow errors to GoBarberError
impl From<anyhow::Error> for GoBarberError {
    fn from(err: anyhow::Error) -> Self {
        GoBarberError::Generic(err.to_string())
    }
}
