//! File repository for database operations.
//!
//! Implements the drive metadata store using SeaORM.

use cumulus_core::drive::{
    DriveError, FileNode, FileRepository as FileRepoTrait, SortDirection, SortField, SortKey,
};
use cumulus_shared::types::{FileId, UserId};
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnAcquireErr, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use tracing::debug;

use crate::entities::files;

/// File repository implementation.
#[derive(Debug, Clone)]
pub struct FileRepository {
    db: DatabaseConnection,
}

impl FileRepository {
    /// Create a new file repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get the underlying connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl FileRepoTrait for FileRepository {
    async fn insert(&self, node: FileNode) -> Result<FileNode, DriveError> {
        let model = to_active_model(&node)?
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        debug!(file_id = %node.id, "File row inserted");
        to_domain(model)
    }

    async fn get_by_id(&self, id: FileId) -> Result<Option<FileNode>, DriveError> {
        let model = files::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        model.map(to_domain).transpose()
    }

    async fn list_children(
        &self,
        owner: UserId,
        parent: Option<FileId>,
    ) -> Result<Vec<FileNode>, DriveError> {
        let models = children_of(owner, parent)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn count_children(
        &self,
        owner: UserId,
        parent: Option<FileId>,
    ) -> Result<u64, DriveError> {
        children_of(owner, parent)
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn list_children_paged(
        &self,
        owner: UserId,
        parent: Option<FileId>,
        offset: u64,
        limit: u64,
        sort: &[SortKey],
    ) -> Result<Vec<FileNode>, DriveError> {
        let models = ordered(children_of(owner, parent), sort)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn count_by_name(&self, owner: UserId, substring: &str) -> Result<u64, DriveError> {
        named_like(owner, substring)
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn search_by_name(
        &self,
        owner: UserId,
        substring: &str,
        offset: u64,
        limit: u64,
        sort: &[SortKey],
    ) -> Result<Vec<FileNode>, DriveError> {
        let models = ordered(named_like(owner, substring), sort)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn update(&self, node: FileNode) -> Result<FileNode, DriveError> {
        let model = to_active_model(&node)?
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => DriveError::NotFound(node.id),
                other => map_db_err(other),
            })?;

        to_domain(model)
    }

    async fn delete(&self, id: FileId) -> Result<bool, DriveError> {
        let result = files::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }
}

fn parent_filter(parent: Option<FileId>) -> SimpleExpr {
    match parent {
        Some(id) => files::Column::ParentId.eq(id.into_inner()),
        None => files::Column::ParentId.is_null(),
    }
}

fn children_of(owner: UserId, parent: Option<FileId>) -> Select<files::Entity> {
    files::Entity::find()
        .filter(files::Column::OwnerId.eq(owner.into_inner()))
        .filter(parent_filter(parent))
}

fn named_like(owner: UserId, substring: &str) -> Select<files::Entity> {
    files::Entity::find()
        .filter(files::Column::OwnerId.eq(owner.into_inner()))
        .filter(
            Expr::col(files::Column::Name)
                .like(LikeExpr::new(like_pattern(substring)).escape('\\')),
        )
}

/// `%substring%` with LIKE wildcards in `substring` escaped.
fn like_pattern(substring: &str) -> String {
    let mut pattern = String::with_capacity(substring.len() + 2);
    pattern.push('%');
    for ch in substring.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Folders first, then `sort`, then ID.
fn ordered(query: Select<files::Entity>, sort: &[SortKey]) -> Select<files::Entity> {
    let query = query.order_by_desc(files::Column::IsDirectory);
    sort.iter()
        .fold(query, |query, key| {
            query.order_by(sort_column(key.field), sort_order(key.direction))
        })
        .order_by_asc(files::Column::Id)
}

fn sort_column(field: SortField) -> files::Column {
    match field {
        SortField::Name => files::Column::Name,
        SortField::UpdatedAt => files::Column::UpdatedAt,
        SortField::CreatedAt => files::Column::CreatedAt,
        SortField::Size => files::Column::Size,
    }
}

fn sort_order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

/// Map a database error; acquire timeouts are transient.
fn map_db_err(err: DbErr) -> DriveError {
    match err {
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => {
            DriveError::timeout("database connection acquire timed out")
        }
        other => DriveError::persistence(other.to_string()),
    }
}

/// Convert domain node to database active model.
fn to_active_model(node: &FileNode) -> Result<files::ActiveModel, DriveError> {
    let size = i64::try_from(node.size)
        .map_err(|_| DriveError::persistence(format!("size {} out of range", node.size)))?;

    Ok(files::ActiveModel {
        id: Set(node.id.into_inner()),
        owner_id: Set(node.owner_id.into_inner()),
        name: Set(node.name.clone()),
        is_directory: Set(node.is_directory),
        parent_id: Set(node.parent_id.map(FileId::into_inner)),
        size: Set(size),
        mime_type: Set(node.mime_type.clone()),
        content_hash: Set(node.content_hash.clone()),
        storage_key: Set(node.storage_key.clone()),
        created_at: Set(node.created_at.into()),
        updated_at: Set(node.updated_at.into()),
    })
}

/// Convert database model to domain model.
fn to_domain(model: files::Model) -> Result<FileNode, DriveError> {
    let size = u64::try_from(model.size).map_err(|_| {
        DriveError::persistence(format!("negative size {} on file {}", model.size, model.id))
    })?;

    Ok(FileNode {
        id: FileId::from_uuid(model.id),
        owner_id: UserId::from_uuid(model.owner_id),
        name: model.name,
        is_directory: model.is_directory,
        parent_id: model.parent_id.map(FileId::from_uuid),
        size,
        mime_type: model.mime_type,
        content_hash: model.content_hash,
        storage_key: model.storage_key,
        created_at: model.created_at.with_timezone(&chrono::Utc),
        updated_at: model.updated_at.with_timezone(&chrono::Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("report"), "%report%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("c:\\tmp"), "%c:\\\\tmp%");
    }
}
