//! Error types and handling for Nightcharge
//!
//! This module defines the error type used throughout the crate. The two
//! charging command warnings are recoverable: the command is ignored and the
//! charger state is left untouched.

use thiserror::Error;

/// Result type alias for Nightcharge operations
pub type Result<T> = std::result::Result<T, NightchargeError>;

/// Main error type for Nightcharge
#[derive(Debug, Error)]
pub enum NightchargeError {
    /// Start requested while a charging session is already running
    #[error("Car is already charging.")]
    AlreadyCharging,

    /// Stop requested while no charging session is running
    #[error("Car is not currently charging.")]
    NotCharging,

    /// Unknown simulation session
    #[error("Session not found: {id}")]
    SessionNotFound { id: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// HTTP/Web server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl NightchargeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        NightchargeError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        NightchargeError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new session lookup error
    pub fn session_not_found<S: Into<String>>(id: S) -> Self {
        NightchargeError::SessionNotFound { id: id.into() }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        NightchargeError::Web {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        NightchargeError::Io {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        NightchargeError::Generic {
            message: message.into(),
        }
    }

    /// Whether this is a recoverable, user-facing command warning
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            NightchargeError::AlreadyCharging | NightchargeError::NotCharging
        )
    }
}

impl From<std::io::Error> for NightchargeError {
    fn from(err: std::io::Error) -> Self {
        NightchargeError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for NightchargeError {
    fn from(err: serde_yaml::Error) -> Self {
        NightchargeError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for NightchargeError {
    fn from(err: serde_json::Error) -> Self {
        NightchargeError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for NightchargeError {
    fn from(err: chrono::ParseError) -> Self {
        NightchargeError::validation("time", err.to_string())
    }
}
