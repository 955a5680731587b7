//! Error types for Saavi
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using SaaviError
pub type Result<T> = std::result::Result<T, SaaviError>;

/// Unified error type for Saavi operations
#[derive(Debug, Error)]
pub enum SaaviError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open file '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("invalid key '{0}' - only alphanumeric key supported")]
    InvalidKey(String),

    #[error("invalid value for key '{0}' - value must not contain a newline")]
    InvalidValue(String),

    // -------------------------------------------------------------------------
    // Log Errors
    // -------------------------------------------------------------------------
    #[error("malformed record at offset {offset}: {record:?}")]
    MalformedRecord { offset: u64, record: String },

    #[error("index corruption: key '{key}' points at offset {offset} holding key '{found}'")]
    IndexCorruption {
        key: String,
        offset: u64,
        found: String,
    },

    // -------------------------------------------------------------------------
    // Shell Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported command")]
    UnsupportedCommand(String),

    #[error("Invalid number of arguments sent to '{command}'\nUse : {usage}")]
    WrongArity { command: String, usage: String },

    #[error("Please open a db file before executing '{0}'")]
    NotOpen(String),

    #[error("Given data directory doesn't exist: {}", .0.display())]
    DataDir(PathBuf),
}
