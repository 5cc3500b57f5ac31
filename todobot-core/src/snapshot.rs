//! Snapshot persistence for the task store.
//!
//! The entire user-to-task-list mapping is one JSON document, rewritten
//! in full after every mutation and read once at startup. The
//! [`SnapshotStorage`] trait is the read-whole/write-whole collaborator
//! seam; [`FileStorage`] is the production flat-file implementation and
//! [`MemoryStorage`] the in-process implementation used by tests.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::task::Task;
use crate::user::UserId;

/// The persisted document: user identity to ordered task list.
///
/// An ordered map so that every encode of the same state produces the
/// same bytes.
pub type SnapshotDocument = BTreeMap<UserId, Vec<Task>>;

/// Errors raised while loading or storing snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The storage medium could not be read.
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The snapshot document could not be written.
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A document exists but does not parse as a task mapping. Fatal at
    /// startup: the process must not proceed with a partially-trusted
    /// mapping.
    #[error("snapshot is corrupt: {0}")]
    Corrupt(serde_json::Error),

    /// The in-memory mapping could not be serialized.
    #[error("snapshot serialization failed: {0}")]
    Serialize(serde_json::Error),
}

/// Encodes the full mapping as the pretty-printed on-disk JSON document.
///
/// # Errors
///
/// Returns [`SnapshotError::Serialize`] if serialization fails.
pub fn encode(document: &SnapshotDocument) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(document).map_err(SnapshotError::Serialize)
}

/// Decodes an on-disk JSON document into the task mapping.
///
/// # Errors
///
/// Returns [`SnapshotError::Corrupt`] if the document does not parse.
pub fn decode(raw: &str) -> Result<SnapshotDocument, SnapshotError> {
    serde_json::from_str(raw).map_err(SnapshotError::Corrupt)
}

/// A storage medium exposing read-whole-document and
/// write-whole-document primitives.
pub trait SnapshotStorage: Send {
    /// Returns the stored document, or `None` if none has ever been
    /// written. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Read`] if the medium exists but cannot
    /// be read.
    fn read(&self) -> Result<Option<String>, SnapshotError>;

    /// Replaces the stored document with `document`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Write`] if the medium cannot be written.
    fn write(&self, document: &str) -> Result<(), SnapshotError>;
}

/// Flat-file snapshot storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Creates file storage backed by the given path. The file need not
    /// exist yet; the parent directory is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, SnapshotError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SnapshotError::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn write(&self, document: &str) -> Result<(), SnapshotError> {
        let map_err = |e| SnapshotError::Write {
            path: self.path.clone(),
            source: e,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(map_err)?;
            }
        }
        std::fs::write(&self.path, document).map_err(map_err)
    }
}

/// In-process snapshot storage for tests.
///
/// Clones share the same underlying cell, so a test can hand one clone
/// to a store and inspect (or reuse) the document through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    document: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    /// Creates empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently stored document, if any.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.document.lock().clone()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, SnapshotError> {
        Ok(self.document.lock().clone())
    }

    fn write(&self, document: &str) -> Result<(), SnapshotError> {
        *self.document.lock() = Some(document.to_string());
        Ok(())
    }
}
