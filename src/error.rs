//! # Error Types
//!
//! Custom error types for SBUS Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for SBUS Bridge
#[derive(Debug, Error)]
pub enum SbusBridgeError {
    /// Serial port errors (open/read/write failures)
    #[error("Serial port error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SBUS Bridge
pub type Result<T> = std::result::Result<T, SbusBridgeError>;
