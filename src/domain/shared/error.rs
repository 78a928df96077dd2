//! Domain errors

use thiserror::Error;

/// Message surfaced for every token endpoint failure.
pub const TOKEN_FETCH_FAILED: &str = "Cannot get token from the url provided";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad or unreachable token endpoint, malformed token payload
    #[error("{0}")]
    Config(String),

    /// Error reported by the telephony provider
    #[error("{message} ({code})")]
    Provider { message: String, code: u32 },

    /// Action requested in a state that does not permit it
    #[error("{0}")]
    Precondition(String),

    /// Call placement attempted before the device reported ready
    #[error("Device is not ready")]
    NotReady,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Settings persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn token_fetch_failed() -> Self {
        DomainError::Config(TOKEN_FETCH_FAILED.to_string())
    }

    pub fn provider(message: impl Into<String>, code: u32) -> Self {
        DomainError::Provider {
            message: message.into(),
            code,
        }
    }
}
