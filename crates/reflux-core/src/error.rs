//! Error types for reflux-core

use crate::selector::SelectorId;
use thiserror::Error;

/// Boxed error returned by fallible reducers and selector projections
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A reducer failed while applying an action.
    ///
    /// The dispatch that triggered it was aborted; the store keeps the last
    /// committed state.
    #[error("reducer for {tag} failed: {source}")]
    Reducer {
        /// Tag of the action being reduced
        tag: &'static str,
        #[source]
        source: BoxError,
    },

    /// A selector projection failed
    #[error("selector {id} failed: {source}")]
    Selector {
        id: SelectorId,
        #[source]
        source: BoxError,
    },

    /// An effect stream failed while it was being registered
    #[error("effect {name} failed: {message}")]
    Effect { name: String, message: String },

    /// A stream stage rejected a value
    #[error("stream error: {0}")]
    Stream(String),

    /// No snapshot with this sequence number in the current timeline
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(u64),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    /// Time travel was requested on a store that does not record history
    #[error("history recording is disabled")]
    HistoryDisabled,

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
