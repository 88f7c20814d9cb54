//! Drive domain types.

use chrono::{DateTime, Utc};
use cumulus_shared::types::{FileId, UserId};
use serde::{Deserialize, Serialize};

/// A file or folder in a user's hierarchy.
///
/// Children are never stored on the node; they are found by querying for
/// nodes whose `parent_id` points here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Node ID, assigned at creation.
    pub id: FileId,
    /// Owning user.
    pub owner_id: UserId,
    /// Display name, unique among siblings where enforced.
    pub name: String,
    /// Folder flag; fixed at creation.
    pub is_directory: bool,
    /// Containing folder, `None` at the root.
    pub parent_id: Option<FileId>,
    /// Content length in bytes (0 for folders).
    pub size: u64,
    /// MIME type of the content.
    pub mime_type: Option<String>,
    /// Lowercase hex SHA-256 of the content.
    pub content_hash: Option<String>,
    /// Blob store key; folders never have one.
    pub storage_key: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl FileNode {
    /// Build a new folder node.
    #[must_use]
    pub fn directory(owner_id: UserId, name: impl Into<String>, parent_id: Option<FileId>) -> Self {
        let now = Utc::now();
        Self {
            id: FileId::new(),
            owner_id,
            name: name.into(),
            is_directory: true,
            parent_id,
            size: 0,
            mime_type: None,
            content_hash: None,
            storage_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a new file node for content already written under `blob.storage_key`.
    #[must_use]
    pub fn file(id: FileId, owner_id: UserId, parent_id: Option<FileId>, blob: StoredBlob) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id,
            name: blob.name,
            is_directory: false,
            parent_id,
            size: blob.size,
            mime_type: Some(blob.mime_type),
            content_hash: Some(blob.content_hash),
            storage_key: Some(blob.storage_key),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user` owns this node.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Refresh `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Description of content written to the blob store for a new file.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// File name.
    pub name: String,
    /// Key the content was written under.
    pub storage_key: String,
    /// Content length in bytes.
    pub size: u64,
    /// MIME type.
    pub mime_type: String,
    /// Lowercase hex SHA-256 of the content.
    pub content_hash: String,
}

/// Input for uploading a new file.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Uploading user.
    pub owner_id: UserId,
    /// Destination folder, `None` for the root.
    pub parent_id: Option<FileId>,
    /// File name.
    pub filename: String,
    /// MIME type; guessed from the filename when absent.
    pub mime_type: Option<String>,
    /// Expected size, used to reject oversized uploads before reading.
    pub size_hint: Option<u64>,
}

impl UploadRequest {
    /// Upload `filename` to the root of `owner_id`'s drive.
    #[must_use]
    pub fn new(owner_id: UserId, filename: impl Into<String>) -> Self {
        Self {
            owner_id,
            parent_id: None,
            filename: filename.into(),
            mime_type: None,
            size_hint: None,
        }
    }

    /// Place the file inside `parent_id`.
    #[must_use]
    pub fn in_folder(mut self, parent_id: FileId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the expected size.
    #[must_use]
    pub fn with_size_hint(mut self, size: u64) -> Self {
        self.size_hint = Some(size);
        self
    }
}

/// Outcome of a recursive delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    /// Metadata records removed.
    pub nodes_removed: u64,
    /// Blobs removed.
    pub blobs_removed: u64,
}
