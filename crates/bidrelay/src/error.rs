//! Error types for bidrelay

use thiserror::Error;

/// Main error type for bidrelay server operations
#[derive(Error, Debug)]
pub enum BidrelayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server/HTTP errors
    #[error("Server error: {0}")]
    Server(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// General errors
    #[error("{0}")]
    General(String),
}

/// Result type alias for bidrelay operations
pub type Result<T> = std::result::Result<T, BidrelayError>;
