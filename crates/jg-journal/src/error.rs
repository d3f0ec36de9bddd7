//! Journal ingestion error types.

use thiserror::Error;

/// Errors that can occur while reading or normalizing journal entries.
///
/// Per-line parse failures are not represented here: a bad line is
/// dropped, never surfaced.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("invalid regex pattern for facility {facility}: {message}")]
    Regex { facility: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Convenience alias for journal results.
pub type LogResult<T> = Result<T, LogError>;
