//! Error types for reflux-router

use thiserror::Error;

/// Router error type
#[derive(Debug, Error)]
pub enum Error {
    /// Dispatching the navigation action failed
    #[error(transparent)]
    Store(#[from] reflux_core::Error),

    /// The bridged store no longer exists
    #[error("Store dropped")]
    StoreDropped,
}

/// Result type for router operations
pub type Result<T> = std::result::Result<T, Error>;
