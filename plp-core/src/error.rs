//! Error types for the platform

use thiserror::Error;

/// Platform-wide error type
#[derive(Error, Debug)]
pub enum PlpError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlpError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        PlpError::InvalidInput(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        PlpError::Storage(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        PlpError::NotFound(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        PlpError::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        PlpError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        PlpError::Internal(msg.into())
    }
}

/// Result type alias for platform operations
pub type PlpResult<T> = Result<T, PlpError>;
