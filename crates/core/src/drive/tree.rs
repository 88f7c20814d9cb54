//! Tree mutations: folder creation, rename, batch move, recursive delete,
//! and path resolution.

use cumulus_shared::types::{FileId, UserId};
use tracing::{debug, info, warn};

use super::config::RenamePolicy;
use super::error::DriveError;
use super::naming::{NameRegistry, validate_name};
use super::repository::FileRepository;
use super::service::DriveService;
use super::types::{DeleteSummary, FileNode};
use crate::storage::BlobStore;

/// One step of the post-order delete walk.
enum Visit {
    Enter(FileNode),
    Exit(FileNode),
}

impl<R: FileRepository, B: BlobStore> DriveService<R, B> {
    /// Create a folder under `parent_id` (or the root).
    ///
    /// Only a same-named sibling folder is a conflict; a same-named file is
    /// tolerated.
    ///
    /// # Errors
    ///
    /// - `InvalidName` for a blank name or one containing `/`
    /// - `ParentNotFound`, `NotADirectory`, `Forbidden` for a bad parent
    /// - `NameConflict` if a sibling folder already has the name
    pub async fn create_folder(
        &self,
        owner: UserId,
        name: &str,
        parent_id: Option<FileId>,
    ) -> Result<FileNode, DriveError> {
        validate_name(name)?;
        self.resolve_folder(owner, parent_id).await?;

        let siblings = self.repo.list_children(owner, parent_id).await?;
        if siblings
            .iter()
            .any(|node| node.is_directory && node.name == name)
        {
            return Err(DriveError::name_conflict(name));
        }

        let folder = self
            .repo
            .insert(FileNode::directory(owner, name, parent_id))
            .await?;

        info!(
            owner_id = %owner,
            file_id = %folder.id,
            name = %folder.name,
            "Folder created"
        );
        Ok(folder)
    }

    /// Rename a node.
    ///
    /// Sibling names are only checked under [`RenamePolicy::RejectConflicts`].
    ///
    /// # Errors
    ///
    /// - `InvalidName` for an unusable name
    /// - `NotFound` / `Forbidden` for a missing or foreign node
    /// - `NameConflict` when rejecting conflicts and a sibling has the name
    pub async fn rename(
        &self,
        owner: UserId,
        id: FileId,
        new_name: &str,
    ) -> Result<FileNode, DriveError> {
        validate_name(new_name)?;
        let mut node = self.get(owner, id).await?;

        if self.config.rename_policy == RenamePolicy::RejectConflicts {
            let siblings = self.repo.list_children(owner, node.parent_id).await?;
            if siblings
                .iter()
                .any(|sibling| sibling.id != id && sibling.name == new_name)
            {
                return Err(DriveError::name_conflict(new_name));
            }
        }

        let old_name = std::mem::replace(&mut node.name, new_name.to_string());
        node.touch();
        let node = self.repo.update(node).await?;

        info!(
            owner_id = %owner,
            file_id = %id,
            from = %old_name,
            to = %node.name,
            "Node renamed"
        );
        Ok(node)
    }

    /// Move `ids` under `target_id` (or the root), in order.
    ///
    /// Name collisions at the destination are resolved with `"name (n)"`
    /// suffixes; later items see names placed by earlier ones. A node already
    /// under the target is left as is.
    ///
    /// Not atomic: a failure stops the batch at the failing node and nodes
    /// moved before it stay moved.
    ///
    /// # Errors
    ///
    /// - `ParentNotFound`, `NotADirectory`, `Forbidden` for a bad target
    /// - `NotFound` / `Forbidden` for a missing or foreign node
    /// - `CircularMove` when a folder would move into itself or a descendant
    /// - `CycleDetected` if the target's ancestor chain loops
    pub async fn batch_move(
        &self,
        owner: UserId,
        ids: &[FileId],
        target_id: Option<FileId>,
    ) -> Result<Vec<FileNode>, DriveError> {
        self.resolve_folder(owner, target_id).await?;

        let existing = self.repo.list_children(owner, target_id).await?;
        let mut registry = NameRegistry::from_names(existing.into_iter().map(|node| node.name));
        let mut moved = Vec::with_capacity(ids.len());

        for &id in ids {
            match self.move_one(owner, id, target_id, &mut registry).await {
                Ok(node) => moved.push(node),
                Err(err) => {
                    warn!(
                        owner_id = %owner,
                        file_id = %id,
                        moved = moved.len(),
                        requested = ids.len(),
                        error = %err,
                        "Batch move aborted"
                    );
                    return Err(err);
                }
            }
        }

        info!(
            owner_id = %owner,
            target_id = ?target_id,
            count = moved.len(),
            "Nodes moved"
        );
        Ok(moved)
    }

    async fn move_one(
        &self,
        owner: UserId,
        id: FileId,
        target_id: Option<FileId>,
        registry: &mut NameRegistry,
    ) -> Result<FileNode, DriveError> {
        let mut node = self.get(owner, id).await?;

        if node.parent_id == target_id {
            debug!(file_id = %id, "Node already in target, skipping");
            return Ok(node);
        }

        if let Some(target) = target_id
            && node.is_directory
        {
            self.ensure_not_within(node.id, target).await?;
        }

        let name = registry.resolve(&node.name, node.is_directory);
        if name != node.name {
            debug!(file_id = %id, from = %node.name, to = %name, "Renamed to avoid collision");
        }

        node.parent_id = target_id;
        node.name = name;
        node.touch();
        let node = self.repo.update(node).await?;
        registry.insert(node.name.clone());

        Ok(node)
    }

    /// Delete a node and, for a folder, its whole subtree.
    ///
    /// Descendants are removed before their folder. A file's blob is deleted
    /// before its record; if the blob delete fails the record stays and the
    /// walk stops. Nodes removed before a failure stay removed.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Forbidden` for a missing or foreign node
    /// - `Storage` / `Persistence` / `Timeout` from the stores
    pub async fn delete(&self, owner: UserId, id: FileId) -> Result<DeleteSummary, DriveError> {
        let root = self.get(owner, id).await?;
        let mut summary = DeleteSummary::default();

        if let Err(err) = self.delete_subtree(owner, root, &mut summary).await {
            warn!(
                owner_id = %owner,
                file_id = %id,
                nodes_removed = summary.nodes_removed,
                blobs_removed = summary.blobs_removed,
                error = %err,
                "Delete aborted"
            );
            return Err(err);
        }

        info!(
            owner_id = %owner,
            file_id = %id,
            nodes_removed = summary.nodes_removed,
            blobs_removed = summary.blobs_removed,
            "Node deleted"
        );
        Ok(summary)
    }

    /// Iterative post-order walk; the owner was checked on the root.
    async fn delete_subtree(
        &self,
        owner: UserId,
        root: FileNode,
        summary: &mut DeleteSummary,
    ) -> Result<(), DriveError> {
        let mut stack = vec![Visit::Enter(root)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(node) if node.is_directory => {
                    let children = self.repo.list_children(owner, Some(node.id)).await?;
                    stack.push(Visit::Exit(node));
                    stack.extend(children.into_iter().map(Visit::Enter));
                }
                Visit::Enter(node) => {
                    if let Some(key) = node.storage_key.as_deref() {
                        self.blobs.delete(key).await?;
                        summary.blobs_removed += 1;
                    }
                    self.remove_record(&node, summary).await?;
                }
                Visit::Exit(node) => self.remove_record(&node, summary).await?,
            }
        }
        Ok(())
    }

    async fn remove_record(
        &self,
        node: &FileNode,
        summary: &mut DeleteSummary,
    ) -> Result<(), DriveError> {
        if self.repo.delete(node.id).await? {
            summary.nodes_removed += 1;
        }
        debug!(file_id = %node.id, name = %node.name, "Record removed");
        Ok(())
    }

    /// Names from the root down to `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` / `Forbidden` for the node, `CycleDetected` if the parent
    /// chain loops.
    pub async fn name_path(&self, owner: UserId, id: FileId) -> Result<Vec<String>, DriveError> {
        let chain = self.ancestry(owner, id).await?;
        Ok(chain.into_iter().map(|node| node.name).collect())
    }

    /// IDs from the root down to `id`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::name_path`].
    pub async fn id_path(&self, owner: UserId, id: FileId) -> Result<Vec<FileId>, DriveError> {
        let chain = self.ancestry(owner, id).await?;
        Ok(chain.into_iter().map(|node| node.id).collect())
    }

    /// `/`-joined name path with a leading `/`, e.g. `/Docs/2024/a.txt`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::name_path`].
    pub async fn display_path(&self, owner: UserId, id: FileId) -> Result<String, DriveError> {
        let names = self.name_path(owner, id).await?;
        Ok(format!("/{}", names.join("/")))
    }
}
