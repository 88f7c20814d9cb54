//! Paged directory listing and name search.

use cumulus_shared::types::{FileId, PageRequest, PageResponse, UserId};
use tracing::debug;

use super::error::DriveError;
use super::repository::FileRepository;
use super::service::DriveService;
use super::types::FileNode;
use crate::storage::BlobStore;

impl<R: FileRepository, B: BlobStore> DriveService<R, B> {
    /// One page of `parent_id`'s children (or the root's).
    ///
    /// Folders come first, then the `sort` keys (`"field:dir,..."`), then ID.
    /// A blank `sort` uses the configured default. Listing an unknown or
    /// foreign folder yields an empty page.
    ///
    /// # Errors
    ///
    /// `InvalidSort` before any query if `sort` is malformed or names a field
    /// outside the allow-list.
    pub async fn list(
        &self,
        owner: UserId,
        parent_id: Option<FileId>,
        page: PageRequest,
        sort: &str,
    ) -> Result<PageResponse<FileNode>, DriveError> {
        let spec = self.config.sort_spec(sort)?;

        let total = self.repo.count_children(owner, parent_id).await?;
        let items = self
            .repo
            .list_children_paged(owner, parent_id, page.offset(), page.limit(), spec.keys())
            .await?;

        debug!(
            owner_id = %owner,
            parent_id = ?parent_id,
            total,
            returned = items.len(),
            "Listed folder"
        );
        Ok(PageResponse::new(items, page, total))
    }

    /// One page of `owner`'s nodes whose name contains `keyword`.
    ///
    /// Ordering is the same as [`Self::list`]. Case sensitivity depends on
    /// the metadata store.
    ///
    /// # Errors
    ///
    /// `InvalidSort` before any query for a bad `sort`.
    pub async fn search(
        &self,
        owner: UserId,
        keyword: &str,
        page: PageRequest,
        sort: &str,
    ) -> Result<PageResponse<FileNode>, DriveError> {
        let spec = self.config.sort_spec(sort)?;

        let total = self.repo.count_by_name(owner, keyword).await?;
        let items = self
            .repo
            .search_by_name(owner, keyword, page.offset(), page.limit(), spec.keys())
            .await?;

        debug!(
            owner_id = %owner,
            keyword = %keyword,
            total,
            returned = items.len(),
            "Searched by name"
        );
        Ok(PageResponse::new(items, page, total))
    }
}
