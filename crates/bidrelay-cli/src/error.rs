use std::fmt;

use thiserror::Error;

/// Errors raised while running a console submission
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Transport-level failure talking to the relay
    #[error("{0}")]
    Http(String),

    /// Reading an attachment from disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A body that claimed to be JSON was not
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The relay URL could not be parsed
    #[error("Invalid relay URL: {0}")]
    Url(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl From<reqwest::Error> for ConsoleError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            ConsoleError::Http(format!("Failed to connect to relay: {e}"))
        } else {
            ConsoleError::Http(format!("Request failed: {e}"))
        }
    }
}

/// Result type alias for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Debug)]
pub struct CliError(pub String);

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CliError {}

impl From<String> for CliError {
    fn from(s: String) -> Self {
        CliError(s)
    }
}

impl From<&str> for CliError {
    fn from(s: &str) -> Self {
        CliError(s.to_string())
    }
}

impl From<ConsoleError> for CliError {
    fn from(e: ConsoleError) -> Self {
        CliError(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError(format!("JSON error: {e}"))
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError(format!("IO error: {e}"))
    }
}

pub type CliResult<T> = Result<T, CliError>;
