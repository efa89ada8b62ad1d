//! Error types for the crawler intelligence engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntelError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid log record: {reason}")]
    InvalidRecord { reason: String },

    #[error("Storage operation failed: {operation} - {source}")]
    Storage {
        operation: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Bot not found: {id}")]
    NotFound { id: String },
}

impl IntelError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn storage(operation: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Storage {
            operation: operation.into(),
            source,
        }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IntelError>;
