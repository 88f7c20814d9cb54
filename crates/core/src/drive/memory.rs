//! In-process metadata store.
//!
//! Nodes live in a concurrent map keyed by ID. Parent/child navigation is
//! always a scan over `parent_id`, never a stored child list, so removing a
//! node cannot leave a dangling forward reference.

use std::sync::Arc;

use cumulus_shared::types::{FileId, UserId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::error::DriveError;
use super::repository::FileRepository;
use super::sort::{SortKey, compare_nodes};
use super::types::FileNode;

/// Metadata store backed by a shared in-memory arena.
///
/// Clones share the same arena.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileRepository {
    nodes: Arc<DashMap<FileId, FileNode>>,
}

impl InMemoryFileRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn collect(&self, matches: impl Fn(&FileNode) -> bool) -> Vec<FileNode> {
        self.nodes
            .iter()
            .filter(|entry| matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn page(mut nodes: Vec<FileNode>, offset: u64, limit: u64, sort: &[SortKey]) -> Vec<FileNode> {
        nodes.sort_by(|a, b| compare_nodes(sort, a, b));
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        nodes.into_iter().skip(offset).take(limit).collect()
    }
}

fn is_child(node: &FileNode, owner: UserId, parent: Option<FileId>) -> bool {
    node.owner_id == owner && node.parent_id == parent
}

fn name_matches(node: &FileNode, owner: UserId, substring: &str) -> bool {
    node.owner_id == owner && node.name.contains(substring)
}

impl FileRepository for InMemoryFileRepository {
    async fn insert(&self, node: FileNode) -> Result<FileNode, DriveError> {
        match self.nodes.entry(node.id) {
            Entry::Occupied(_) => Err(DriveError::persistence(format!(
                "duplicate node id {}",
                node.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(node.clone());
                Ok(node)
            }
        }
    }

    async fn get_by_id(&self, id: FileId) -> Result<Option<FileNode>, DriveError> {
        Ok(self.nodes.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_children(
        &self,
        owner: UserId,
        parent: Option<FileId>,
    ) -> Result<Vec<FileNode>, DriveError> {
        Ok(self.collect(|node| is_child(node, owner, parent)))
    }

    async fn count_children(
        &self,
        owner: UserId,
        parent: Option<FileId>,
    ) -> Result<u64, DriveError> {
        let count = self
            .nodes
            .iter()
            .filter(|entry| is_child(entry.value(), owner, parent))
            .count();
        Ok(count as u64)
    }

    async fn list_children_paged(
        &self,
        owner: UserId,
        parent: Option<FileId>,
        offset: u64,
        limit: u64,
        sort: &[SortKey],
    ) -> Result<Vec<FileNode>, DriveError> {
        let children = self.collect(|node| is_child(node, owner, parent));
        Ok(Self::page(children, offset, limit, sort))
    }

    async fn count_by_name(&self, owner: UserId, substring: &str) -> Result<u64, DriveError> {
        let count = self
            .nodes
            .iter()
            .filter(|entry| name_matches(entry.value(), owner, substring))
            .count();
        Ok(count as u64)
    }

    async fn search_by_name(
        &self,
        owner: UserId,
        substring: &str,
        offset: u64,
        limit: u64,
        sort: &[SortKey],
    ) -> Result<Vec<FileNode>, DriveError> {
        let found = self.collect(|node| name_matches(node, owner, substring));
        Ok(Self::page(found, offset, limit, sort))
    }

    async fn update(&self, node: FileNode) -> Result<FileNode, DriveError> {
        match self.nodes.get_mut(&node.id) {
            Some(mut entry) => {
                *entry = node.clone();
                Ok(node)
            }
            None => Err(DriveError::NotFound(node.id)),
        }
    }

    async fn delete(&self, id: FileId) -> Result<bool, DriveError> {
        Ok(self.nodes.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::sort::SortField;

    fn file(owner: UserId, name: &str, parent: Option<FileId>) -> FileNode {
        let mut node = FileNode::directory(owner, name, parent);
        node.is_directory = false;
        node
    }

    #[tokio::test]
    async fn test_children_are_scoped_by_owner_and_parent() {
        let repo = InMemoryFileRepository::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let docs = repo
            .insert(FileNode::directory(alice, "Docs", None))
            .await
            .unwrap();
        repo.insert(file(alice, "a.txt", Some(docs.id))).await.unwrap();
        repo.insert(file(alice, "root.txt", None)).await.unwrap();
        repo.insert(file(bob, "b.txt", None)).await.unwrap();

        assert_eq!(repo.count_children(alice, None).await.unwrap(), 2);
        assert_eq!(repo.count_children(alice, Some(docs.id)).await.unwrap(), 1);
        assert_eq!(repo.count_children(bob, None).await.unwrap(), 1);
        assert_eq!(repo.count_children(bob, Some(docs.id)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_paged_listing_orders_and_slices() {
        let repo = InMemoryFileRepository::new();
        let owner = UserId::new();
        for name in ["c.txt", "a.txt", "b.txt"] {
            repo.insert(file(owner, name, None)).await.unwrap();
        }
        repo.insert(FileNode::directory(owner, "z-folder", None))
            .await
            .unwrap();

        let sort = [SortKey::asc(SortField::Name)];
        let first = repo
            .list_children_paged(owner, None, 0, 2, &sort)
            .await
            .unwrap();
        let second = repo
            .list_children_paged(owner, None, 2, 2, &sort)
            .await
            .unwrap();

        let names: Vec<_> = first.iter().chain(&second).map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["z-folder", "a.txt", "b.txt", "c.txt"]);
    }

    #[tokio::test]
    async fn test_update_missing_node_is_not_found() {
        let repo = InMemoryFileRepository::new();
        let node = FileNode::directory(UserId::new(), "ghost", None);
        let err = repo.update(node.clone()).await.unwrap_err();
        assert!(matches!(err, DriveError::NotFound(id) if id == node.id));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let repo = InMemoryFileRepository::new();
        let node = repo
            .insert(FileNode::directory(UserId::new(), "tmp", None))
            .await
            .unwrap();
        assert!(repo.delete(node.id).await.unwrap());
        assert!(!repo.delete(node.id).await.unwrap());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_search_by_name_substring() {
        let repo = InMemoryFileRepository::new();
        let owner = UserId::new();
        repo.insert(file(owner, "invoice-2024.pdf", None)).await.unwrap();
        repo.insert(file(owner, "notes.md", None)).await.unwrap();
        repo.insert(file(UserId::new(), "invoice-other.pdf", None))
            .await
            .unwrap();

        assert_eq!(repo.count_by_name(owner, "invoice").await.unwrap(), 1);
        let found = repo
            .search_by_name(owner, "invoice", 0, 10, &[])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "invoice-2024.pdf");
    }
}
