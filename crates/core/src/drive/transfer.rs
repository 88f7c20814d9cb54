//! Upload and download: the blob/metadata ordering lives here.

use bytes::Bytes;
use cumulus_shared::types::{FileId, UserId};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, warn};

use super::error::DriveError;
use super::naming::validate_name;
use super::repository::FileRepository;
use super::service::DriveService;
use super::types::{FileNode, StoredBlob, UploadRequest};
use crate::storage::{BlobStore, PresignedUrl};

/// Blob key for a file: a pure function of its owner and ID.
#[must_use]
pub fn storage_key_for(owner: UserId, id: FileId) -> String {
    format!("{owner}/{id}")
}

/// Lowercase hex SHA-256 of `content`.
#[must_use]
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

impl<R: FileRepository, B: BlobStore> DriveService<R, B> {
    /// Store `content` as a new file.
    ///
    /// The blob is written first; the record is only inserted after the write
    /// succeeds. If the insert then fails the blob is left orphaned and a
    /// warning is logged.
    ///
    /// Sibling names are not checked; uploads always create a new node.
    ///
    /// # Errors
    ///
    /// - `InvalidName` for an unusable filename
    /// - `FileTooLarge` if the hint or the content exceeds the limit
    /// - `ParentNotFound`, `NotADirectory`, `Forbidden` for a bad parent
    /// - `Content` if reading `content` fails
    /// - `Storage` / `Persistence` / `Timeout` from the stores
    pub async fn upload<Rd>(
        &self,
        request: UploadRequest,
        content: Rd,
    ) -> Result<FileNode, DriveError>
    where
        Rd: AsyncRead + Unpin + Send,
    {
        let max = self.config.max_upload_size;
        validate_name(&request.filename)?;
        if let Some(hint) = request.size_hint
            && hint > max
        {
            return Err(DriveError::FileTooLarge { size: hint, max });
        }

        let owner = request.owner_id;
        self.resolve_folder(owner, request.parent_id).await?;

        let mut buffer = Vec::new();
        content
            .take(max.saturating_add(1))
            .read_to_end(&mut buffer)
            .await
            .map_err(DriveError::Content)?;
        let size = buffer.len() as u64;
        if size > max {
            return Err(DriveError::FileTooLarge { size, max });
        }

        let id = FileId::new();
        let storage_key = storage_key_for(owner, id);
        let mime_type = request.mime_type.unwrap_or_else(|| {
            mime_guess::from_path(&request.filename)
                .first_or_octet_stream()
                .to_string()
        });
        let blob = StoredBlob {
            name: request.filename,
            content_hash: content_hash(&buffer),
            storage_key,
            size,
            mime_type,
        };

        self.blobs.put(&blob.storage_key, Bytes::from(buffer)).await?;

        let key = blob.storage_key.clone();
        let node = FileNode::file(id, owner, request.parent_id, blob);
        let node = match self.repo.insert(node).await {
            Ok(node) => node,
            Err(err) => {
                warn!(
                    owner_id = %owner,
                    file_id = %id,
                    storage_key = %key,
                    error = %err,
                    "Metadata insert failed after blob write; blob orphaned"
                );
                return Err(err);
            }
        };

        info!(
            owner_id = %owner,
            file_id = %node.id,
            name = %node.name,
            size = node.size,
            provider = self.blobs.provider_name(),
            "File uploaded"
        );
        Ok(node)
    }

    /// Fetch a file's record and full content.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Forbidden` for a missing or foreign node
    /// - `IsADirectory` for a folder
    /// - `SizeMismatch` if the stored content length differs from the record
    /// - `Storage` / `Timeout` from the blob store
    pub async fn download(
        &self,
        owner: UserId,
        id: FileId,
    ) -> Result<(FileNode, Bytes), DriveError> {
        let node = self.get(owner, id).await?;
        let key = Self::blob_key(&node)?;

        let content = self.blobs.get(key).await?;
        let actual = content.len() as u64;
        if actual != node.size {
            return Err(DriveError::SizeMismatch {
                expected: node.size,
                actual,
            });
        }
        Ok((node, content))
    }

    /// Signed URL for the object under `storage_key`.
    ///
    /// No ownership check is made; use [`Self::file_url`] for caller-facing
    /// links.
    ///
    /// # Errors
    ///
    /// `Storage` if the backend cannot produce a URL.
    pub async fn signed_url(&self, storage_key: &str) -> Result<PresignedUrl, DriveError> {
        Ok(self
            .blobs
            .signed_url(storage_key, self.config.signed_url_ttl)
            .await?)
    }

    /// Signed download URL for a file owned by `owner`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `IsADirectory`, or a blob store failure.
    pub async fn file_url(&self, owner: UserId, id: FileId) -> Result<PresignedUrl, DriveError> {
        let node = self.get(owner, id).await?;
        let key = Self::blob_key(&node)?;
        self.signed_url(key).await
    }

    fn blob_key(node: &FileNode) -> Result<&str, DriveError> {
        if node.is_directory {
            return Err(DriveError::IsADirectory(node.id));
        }
        node.storage_key
            .as_deref()
            .ok_or_else(|| DriveError::persistence(format!("file {} has no storage key", node.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_is_deterministic() {
        let owner = UserId::new();
        let id = FileId::new();
        assert_eq!(storage_key_for(owner, id), storage_key_for(owner, id));
        assert_eq!(storage_key_for(owner, id), format!("{owner}/{id}"));
    }

    #[test]
    fn test_content_hash_is_lowercase_hex_sha256() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
