//! Errors raised while loading or writing registry snapshots.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::domain::Identity;
use crate::domain::ports::UserStoreError;
use crate::outbound::memory::TableIntegrityError;

/// Failures of the JSON snapshot adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The snapshot path has no usable file name.
    #[error("snapshot path {path} must name a file")]
    InvalidPath {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// Reading or writing the snapshot failed.
    #[error("snapshot I/O failed for {path}: {message}")]
    Io {
        /// File involved.
        path: Utf8PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// The snapshot is not valid JSON or a field failed validation.
    #[error("snapshot {path} is malformed: {message}")]
    Parse {
        /// File involved.
        path: Utf8PathBuf,
        /// Parser error text.
        message: String,
    },
    /// The snapshot was written by a different format version.
    #[error("unsupported snapshot version: expected {expected}, got {actual}")]
    UnsupportedVersion {
        /// Version this build reads.
        expected: u32,
        /// Version found in the file.
        actual: u64,
    },
    /// The stored records break a registry invariant.
    #[error("snapshot {path} is corrupted: {source}")]
    Corrupted {
        /// File involved.
        path: Utf8PathBuf,
        /// Broken invariant.
        #[source]
        source: TableIntegrityError,
    },
    /// The snapshot belongs to a different owner.
    #[error("snapshot is owned by {stored}, not {expected}")]
    OwnerMismatch {
        /// Owner the caller expected.
        expected: Identity,
        /// Owner recorded in the file.
        stored: Identity,
    },
}

impl From<SnapshotError> for UserStoreError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::InvalidPath { .. } | SnapshotError::Io { .. } => {
                Self::persistence(err.to_string())
            }
            SnapshotError::Parse { .. }
            | SnapshotError::UnsupportedVersion { .. }
            | SnapshotError::Corrupted { .. }
            | SnapshotError::OwnerMismatch { .. } => Self::corrupted(err.to_string()),
        }
    }
}
