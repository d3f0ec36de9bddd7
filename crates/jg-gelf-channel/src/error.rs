//! GELF transport error types.

use thiserror::Error;

/// Errors that can occur while setting up or using a GELF transport.
#[derive(Debug, Error)]
pub enum GelfError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("send error: {0}")]
    Send(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("message of {size} bytes needs more than {max_chunks} chunks")]
    TooLarge { size: usize, max_chunks: usize },

    #[error("{0}")]
    Other(String),
}

/// Convenience alias for GELF transport results.
pub type GelfResult<T> = Result<T, GelfError>;
