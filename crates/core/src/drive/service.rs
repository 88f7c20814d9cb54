//! Drive service: shared state and lookups used by every operation.

use std::collections::HashSet;
use std::sync::Arc;

use cumulus_shared::types::{FileId, UserId};

use super::config::DriveConfig;
use super::error::DriveError;
use super::repository::FileRepository;
use super::types::FileNode;
use crate::storage::BlobStore;

/// Drive service coordinating the metadata store and the blob store.
///
/// The service holds no per-request state and takes no locks; any number of
/// callers may use it concurrently. Ordering between the two stores is the
/// only consistency mechanism: blob before metadata on create, blob before
/// metadata on delete.
pub struct DriveService<R: FileRepository, B: BlobStore> {
    pub(super) repo: Arc<R>,
    pub(super) blobs: Arc<B>,
    pub(super) config: DriveConfig,
}

impl<R: FileRepository, B: BlobStore> Clone for DriveService<R, B> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            blobs: Arc::clone(&self.blobs),
            config: self.config.clone(),
        }
    }
}

impl<R: FileRepository, B: BlobStore> DriveService<R, B> {
    /// Create a new drive service.
    #[must_use]
    pub fn new(repo: Arc<R>, blobs: Arc<B>, config: DriveConfig) -> Self {
        Self {
            repo,
            blobs,
            config,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    /// Get a node owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node does not exist, `Forbidden` if another
    /// user owns it.
    pub async fn get(&self, owner: UserId, id: FileId) -> Result<FileNode, DriveError> {
        let node = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(DriveError::NotFound(id))?;

        if !node.is_owned_by(owner) {
            return Err(DriveError::Forbidden);
        }
        Ok(node)
    }

    /// Resolve an optional destination folder for `owner`.
    ///
    /// `None` is the root and always valid.
    pub(super) async fn resolve_folder(
        &self,
        owner: UserId,
        folder_id: Option<FileId>,
    ) -> Result<Option<FileNode>, DriveError> {
        let Some(id) = folder_id else {
            return Ok(None);
        };

        let folder = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(DriveError::ParentNotFound(id))?;

        if !folder.is_directory {
            return Err(DriveError::NotADirectory(id));
        }
        if !folder.is_owned_by(owner) {
            return Err(DriveError::Forbidden);
        }
        Ok(Some(folder))
    }

    /// Fail if `target` is `source` or lies beneath it.
    ///
    /// Walks upward from `target` to the root.
    pub(super) async fn ensure_not_within(
        &self,
        source: FileId,
        target: FileId,
    ) -> Result<(), DriveError> {
        let mut visited = HashSet::new();
        let mut current = Some(target);

        while let Some(id) = current {
            if id == source {
                return Err(DriveError::CircularMove {
                    source_id: source,
                    target_id: target,
                });
            }
            if !visited.insert(id) {
                return Err(DriveError::CycleDetected(id));
            }
            let folder = self
                .repo
                .get_by_id(id)
                .await?
                .ok_or(DriveError::NotFound(id))?;
            current = folder.parent_id;
        }
        Ok(())
    }

    /// The chain of nodes from the root down to `id`, inclusive.
    pub(super) async fn ancestry(
        &self,
        owner: UserId,
        id: FileId,
    ) -> Result<Vec<FileNode>, DriveError> {
        let node = self.get(owner, id).await?;
        let mut visited = HashSet::from([node.id]);
        let mut parent = node.parent_id;
        let mut chain = vec![node];

        while let Some(parent_id) = parent {
            if !visited.insert(parent_id) {
                return Err(DriveError::CycleDetected(parent_id));
            }
            let folder = self
                .repo
                .get_by_id(parent_id)
                .await?
                .ok_or(DriveError::NotFound(parent_id))?;
            parent = folder.parent_id;
            chain.push(folder);
        }

        chain.reverse();
        Ok(chain)
    }
}
