//! Error types for reflux-devtools

use thiserror::Error;

/// Devtools error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error raised by the inspected store
    #[error(transparent)]
    Store(#[from] reflux_core::Error),

    /// Invalid sequence range
    #[error("Invalid sequence range: {0}..{1}")]
    InvalidSeqRange(u64, u64),

    /// Export error
    #[error("Export error: {0}")]
    ExportError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for devtools operations
pub type Result<T> = std::result::Result<T, Error>;
