//! # Error Types
//!
//! Custom error types for IR Monitor using `thiserror`.

use thiserror::Error;

/// Main error type for IR Monitor
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Serial device could not be opened or configured
    #[error("Serial port error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Command line errors
    #[error("Invalid arguments: {0}")]
    Cli(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for IR Monitor
pub type Result<T> = std::result::Result<T, MonitorError>;
