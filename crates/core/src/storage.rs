//! Flat JSON file persistence for record collections.

use std::{
    fs,
    io::{self, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StorageError;

/// A single JSON file holding an ordered list of `T`.
///
/// The store keeps no records of its own; callers hand it the full
/// collection on every save and receive a fresh one on every load.
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record from disk.
    ///
    /// A missing, empty, unreadable or unparsable file yields an empty list
    /// rather than an error so a damaged store never prevents startup.
    pub fn load(&self) -> Vec<T> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store does not exist yet");
                return Vec::new();
            }
            Err(err) => {
                warn!("Failed to read store {}: {err}", self.path.display());
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Option<Vec<T>>>(&content) {
            Ok(records) => {
                let records = records.unwrap_or_default();
                debug!(path = %self.path.display(), count = records.len(), "loaded store");
                records
            }
            Err(err) => {
                warn!(
                    "Failed to parse store {}, treating it as empty: {err}",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    /// Replace the file contents with `records`.
    ///
    /// The data is written to a sibling temporary file and renamed into
    /// place, so a failed save leaves the previous contents intact.
    pub fn save(&self, records: &[T]) -> Result<(), StorageError> {
        let parent = self.parent_dir();
        fs::create_dir_all(&parent).map_err(|source| StorageError::CreateDir {
            path: parent.clone(),
            source,
        })?;

        let serialised =
            serde_json::to_vec_pretty(records).map_err(|source| StorageError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        let mut staged = NamedTempFile::new_in(&parent).map_err(write_err)?;
        staged.write_all(&serialised).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;
        staged
            .persist(&self.path)
            .map_err(|source| StorageError::Persist {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), count = records.len(), "saved store");
        Ok(())
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
