//! Error types surfaced by the library service and its stores.

use std::path::PathBuf;

use thiserror::Error;

/// Failures writing a JSON store.
///
/// Reads never produce these; an unreadable store is treated as empty.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StorageError {
    /// The directory holding the store could not be created.
    #[error("failed to create store directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The records could not be encoded as JSON.
    #[error("failed to serialise {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing the temporary file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Renaming the temporary file over the store failed.
    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A [`crate::Player`].
    Player,
    /// A [`crate::Game`].
    Game,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Player => f.write_str("player"),
            Entity::Game => f.write_str("game"),
        }
    }
}

/// Errors returned by [`crate::GameLibrary`] operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// A required field was blank, or a numeric argument was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced player or game does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Which collection was searched.
        entity: Entity,
        /// The identifier that had no match.
        id: i32,
    },

    /// Persisting the change failed; the in-memory state was left untouched.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LibraryError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }
}
