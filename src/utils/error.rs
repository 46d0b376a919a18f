//! Error types for the companion
//!
//! This module defines custom error types used throughout the crate.
//! We use thiserror for convenient error type definitions and anyhow for
//! binary-level error handling. Inside the playback core most of these are
//! logged and swallowed: the companion is decorative and never fails the host.

use thiserror::Error;

/// Main error type for the companion
#[derive(Error, Debug)]
pub enum CompanionError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Playback could not start (autoplay blocked, decode failure)
    #[error("Playback error: {0}")]
    Playback(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl From<toml::de::Error> for CompanionError {
    fn from(err: toml::de::Error) -> Self {
        CompanionError::Config(format!("TOML error: {}", err))
    }
}

impl From<serde_json::Error> for CompanionError {
    fn from(err: serde_json::Error) -> Self {
        CompanionError::Config(format!("JSON error: {}", err))
    }
}

impl CompanionError {
    /// Create a playback error from string
    pub fn playback_error<S: Into<String>>(msg: S) -> Self {
        CompanionError::Playback(msg.into())
    }

    /// Whether the error is one the playback core recovers from locally
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CompanionError::Playback(_))
    }
}

/// Convenience type alias for Results in the companion
pub type Result<T> = std::result::Result<T, CompanionError>;

/// Extension trait for converting other errors to CompanionError
pub trait IntoCompanionError<T> {
    /// Convert this error into a CompanionError with the given context
    fn config_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoCompanionError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| CompanionError::Config(format!("{}: {}", context, e)))
    }
}
