//! Error handling for the AirMessage client core
//!
//! Errors are automatically converted from underlying library errors using `thiserror`.
//!
//! ## Error Handling Patterns
//!
//! ```rust
//! use airmessage_core::Result;
//!
//! fn parse_details(data: &str) -> Result<serde_json::Value> {
//!     // JSON errors are converted through the From trait
//!     let value: serde_json::Value = serde_json::from_str(data)?;
//!     Ok(value)
//! }
//! ```
//!
//! Failures that the application deliberately tolerates (a contacts backend
//! that cannot be loaded, a settler dropped without settling) are logged with
//! `tracing::warn!` and swallowed instead of being surfaced as `CoreError`.
//!
//! ## Error Categories
//!
//! ### I/O Errors
//! File system failures, converted from `std::io::Error`.
//!
//! ### Serialization Errors
//! JSON parsing failures, converted from `serde_json::Error`.
//!
//! ### Decoding Errors
//! Malformed base64 or hex text.
//!
//! ### Domain Errors
//! - `Configuration`: invalid or missing settings
//! - `InvalidState`: an operation was attempted in the wrong lifecycle state

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in the client core
///
/// # Examples
///
/// ```rust
/// use airmessage_core::CoreError;
///
/// let error = CoreError::Configuration("unknown platform".to_string());
/// assert_eq!(error.to_string(), "Configuration error: unknown platform");
/// ```
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O error (file system, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 text could not be decoded
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Hex text could not be decoded
    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Configuration error
    ///
    /// This error occurs when configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid state
    ///
    /// This error occurs when an operation is attempted in an invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl CoreError {
    /// Create an invalid state error
    ///
    /// ```rust
    /// use airmessage_core::CoreError;
    ///
    /// let error = CoreError::invalid_state("task queue worker stopped");
    /// assert!(matches!(error, CoreError::InvalidState(_)));
    /// ```
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        CoreError::InvalidState(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        CoreError::Configuration(msg.into())
    }

    /// Get a user-friendly error message suitable for display in UI
    ///
    /// ```rust
    /// use airmessage_core::CoreError;
    ///
    /// let error = CoreError::configuration("missing contacts file");
    /// assert_eq!(
    ///     error.user_message(),
    ///     "Configuration error: missing contacts file. Check your settings."
    /// );
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Io(e) => format!("I/O error: {}.", e),
            CoreError::Json(e) => format!("Data format error: {}.", e),
            CoreError::Base64(e) => format!("Invalid encoded data: {}.", e),
            CoreError::Hex(e) => format!("Invalid encoded data: {}.", e),
            CoreError::Configuration(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            CoreError::InvalidState(msg) => format!("Invalid state: {}.", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::InvalidState("not initialized".to_string());
        assert_eq!(error.to_string(), "Invalid state: not initialized");

        let error = CoreError::Configuration("bad platform".to_string());
        assert_eq!(error.to_string(), "Configuration error: bad platform");
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io::{Error, ErrorKind};

        let io_error = Error::new(ErrorKind::NotFound, "file not found");
        let core_error: CoreError = io_error.into();

        assert!(matches!(core_error, CoreError::Io(_)));
        assert!(core_error.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json = r#"{"invalid json"#;
        let json_error = serde_json::from_str::<serde_json::Value>(json).unwrap_err();
        let core_error: CoreError = json_error.into();

        assert!(matches!(core_error, CoreError::Json(_)));
    }
}
