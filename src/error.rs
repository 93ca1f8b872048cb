//! Error types for minikv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for minikv operations
///
/// Absent keys and empty keys are not errors: `get` returns `Ok(None)` and
/// `set`/`delete` silently do nothing.
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Codec Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    // -------------------------------------------------------------------------
    // Append Log Errors
    // -------------------------------------------------------------------------
    /// No record at or beyond `offset`. Terminates scans; never returned by
    /// the engine's public operations.
    #[error("End of log at offset {offset}")]
    EndOfLog { offset: u64 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KvError {
    /// True if this is the end-of-log sentinel
    pub fn is_end_of_log(&self) -> bool {
        matches!(self, KvError::EndOfLog { .. })
    }
}
