//! Error types for FacilityDesk
//!
//! Provides a unified error type for all ticket lifecycle operations.
//! The first four variants are reported to callers as-is; everything else is
//! an internal failure.

use thiserror::Error;

/// Result type alias for FacilityDesk operations
pub type Result<T> = std::result::Result<T, DeskError>;

/// Main error type for FacilityDesk operations
#[derive(Debug, Error)]
pub enum DeskError {
    /// Missing or malformed input; no state was changed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown ticket or user
    #[error("Not found: {0}")]
    NotFound(String),

    /// Requested status change is not allowed from the current state
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Actor is not allowed to perform this change
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Notification or audit sink failure
    #[error("Sink error: {0}")]
    Sink(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// SQL error
    #[error("SQL error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl DeskError {
    /// True for failures the caller cannot act on (storage, config, IO, ...)
    pub fn is_internal(&self) -> bool {
        !matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::InvalidTransition(_) | Self::Unauthorized(_)
        )
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<anyhow::Error> for DeskError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for DeskError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for DeskError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}
