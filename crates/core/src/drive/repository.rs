//! Metadata store contract.

use std::future::Future;

use cumulus_shared::types::{FileId, UserId};

use super::error::DriveError;
use super::sort::SortKey;
use super::types::FileNode;

/// Repository trait for file node persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
/// Every call touches a single node or a single owner+parent pair; no
/// multi-row transaction is assumed. `parent == None` matches root-level
/// nodes only.
///
/// Paged queries must return folders first, then order by `sort`, then by ID.
pub trait FileRepository: Send + Sync {
    /// Persist a new node.
    fn insert(
        &self,
        node: FileNode,
    ) -> impl Future<Output = Result<FileNode, DriveError>> + Send;

    /// Find a node by ID.
    fn get_by_id(
        &self,
        id: FileId,
    ) -> impl Future<Output = Result<Option<FileNode>, DriveError>> + Send;

    /// All children of `parent` owned by `owner`.
    fn list_children(
        &self,
        owner: UserId,
        parent: Option<FileId>,
    ) -> impl Future<Output = Result<Vec<FileNode>, DriveError>> + Send;

    /// Number of children of `parent` owned by `owner`.
    fn count_children(
        &self,
        owner: UserId,
        parent: Option<FileId>,
    ) -> impl Future<Output = Result<u64, DriveError>> + Send;

    /// One ordered page of `parent`'s children.
    fn list_children_paged(
        &self,
        owner: UserId,
        parent: Option<FileId>,
        offset: u64,
        limit: u64,
        sort: &[SortKey],
    ) -> impl Future<Output = Result<Vec<FileNode>, DriveError>> + Send;

    /// Number of `owner`'s nodes whose name contains `substring`.
    fn count_by_name(
        &self,
        owner: UserId,
        substring: &str,
    ) -> impl Future<Output = Result<u64, DriveError>> + Send;

    /// One ordered page of `owner`'s nodes whose name contains `substring`.
    fn search_by_name(
        &self,
        owner: UserId,
        substring: &str,
        offset: u64,
        limit: u64,
        sort: &[SortKey],
    ) -> impl Future<Output = Result<Vec<FileNode>, DriveError>> + Send;

    /// Overwrite an existing node.
    ///
    /// Fails with `NotFound` if the node no longer exists.
    fn update(
        &self,
        node: FileNode,
    ) -> impl Future<Output = Result<FileNode, DriveError>> + Send;

    /// Remove a node record. Returns whether a record was removed.
    fn delete(&self, id: FileId) -> impl Future<Output = Result<bool, DriveError>> + Send;
}
