//! Drive error types.

use cumulus_shared::types::FileId;
use thiserror::Error;

use crate::storage::StorageError;

/// Drive operation errors.
///
/// Structural and validation errors are raised before anything is mutated.
/// Store failures during multi-node operations (batch move, recursive delete)
/// stop at the failing node; earlier steps stay applied.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Node not found.
    #[error("file not found: {0}")]
    NotFound(FileId),

    /// Parent or target folder not found.
    #[error("parent folder not found: {0}")]
    ParentNotFound(FileId),

    /// Node belongs to another user.
    #[error("access denied")]
    Forbidden,

    /// A folder was required.
    #[error("not a directory: {0}")]
    NotADirectory(FileId),

    /// A file was required.
    #[error("is a directory: {0}")]
    IsADirectory(FileId),

    /// A sibling already uses the name.
    #[error("name already exists: {name}")]
    NameConflict {
        /// The conflicting name.
        name: String,
    },

    /// Name is empty or contains a path separator.
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// A folder cannot move into itself or one of its descendants.
    #[error("cannot move folder {source_id} into its own descendant {target_id}")]
    CircularMove {
        /// Folder being moved.
        source_id: FileId,
        /// Requested destination.
        target_id: FileId,
    },

    /// The parent chain loops back on itself.
    #[error("cycle detected in folder chain at {0}")]
    CycleDetected(FileId),

    /// Sort specification rejected.
    #[error("invalid sort: {0}")]
    InvalidSort(String),

    /// Stored content length differs from the recorded size.
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Recorded size.
        expected: u64,
        /// Size of the retrieved content.
        actual: u64,
    },

    /// Upload exceeds the configured maximum.
    #[error("file too large: {size} bytes exceeds maximum {max} bytes")]
    FileTooLarge {
        /// Observed size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Reading the caller-supplied content failed.
    #[error("failed to read upload content: {0}")]
    Content(#[source] std::io::Error),

    /// Blob store operation failed.
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),

    /// Metadata store operation failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A store call exceeded its deadline.
    #[error("timed out: {0}")]
    Timeout(String),
}

impl DriveError {
    /// Create a persistence error.
    #[must_use]
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an invalid sort error.
    #[must_use]
    pub fn invalid_sort(msg: impl Into<String>) -> Self {
        Self::InvalidSort(msg.into())
    }

    /// Create a name conflict error.
    #[must_use]
    pub fn name_conflict(name: impl Into<String>) -> Self {
        Self::NameConflict { name: name.into() }
    }

    /// Whether retrying the same call might succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Stable machine-readable code for callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::ParentNotFound(_) => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::NotADirectory(_) => "NOT_A_DIRECTORY",
            Self::IsADirectory(_) => "IS_A_DIRECTORY",
            Self::NameConflict { .. } => "NAME_CONFLICT",
            Self::InvalidName(_) => "INVALID_NAME",
            Self::CircularMove { .. } => "CIRCULAR_MOVE",
            Self::CycleDetected(_) => "CYCLE_DETECTED",
            Self::InvalidSort(_) => "INVALID_SORT",
            Self::SizeMismatch { .. } => "SIZE_MISMATCH",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::Content(_) => "CONTENT_READ_FAILED",
            Self::Storage(_) => "STORAGE_FAILURE",
            Self::Persistence(_) => "PERSISTENCE_FAILURE",
            Self::Timeout(_) => "TIMEOUT",
        }
    }
}

impl From<StorageError> for DriveError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Timeout { .. } => Self::Timeout(err.to_string()),
            other => Self::Storage(other),
        }
    }
}
