//! Test doubles for the drive engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use cumulus_shared::types::{FileId, UserId};

use super::config::DriveConfig;
use super::error::DriveError;
use super::memory::InMemoryFileRepository;
use super::repository::FileRepository;
use super::service::DriveService;
use super::sort::SortKey;
use super::types::FileNode;
use crate::storage::{
    BlobStore, PresignedUrl, StorageConfig, StorageError, StorageProvider, StorageService,
};

/// Memory-backed blob store with switchable failures.
#[derive(Clone)]
pub struct FaultyBlobStore {
    inner: StorageService,
    pub fail_put: Arc<AtomicBool>,
    pub fail_delete: Arc<AtomicBool>,
    pub deletes: Arc<AtomicUsize>,
}

impl FaultyBlobStore {
    pub fn new() -> Self {
        let inner = StorageService::from_config(StorageConfig::new(StorageProvider::Memory))
            .expect("memory backend");
        Self {
            inner,
            fail_put: Arc::default(),
            fail_delete: Arc::default(),
            deletes: Arc::default(),
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.exists(key).await.expect("stat")
    }
}

impl BlobStore for FaultyBlobStore {
    async fn put(&self, key: &str, content: Bytes) -> Result<(), StorageError> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::operation("injected put failure"));
        }
        self.inner.put(key, content).await
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::operation("injected delete failure"));
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<PresignedUrl, StorageError> {
        self.inner.signed_url(key, ttl).await
    }

    fn provider_name(&self) -> &'static str {
        "faulty-memory"
    }
}

/// In-memory repository that can fail inserts or fail updates after a quota.
#[derive(Clone, Default)]
pub struct FaultyRepository {
    pub inner: InMemoryFileRepository,
    pub fail_insert: Arc<AtomicBool>,
    /// Updates allowed before every further update fails; `usize::MAX` disables.
    pub updates_left: Arc<AtomicUsize>,
}

impl FaultyRepository {
    pub fn new() -> Self {
        Self {
            updates_left: Arc::new(AtomicUsize::new(usize::MAX)),
            ..Self::default()
        }
    }
}

impl FileRepository for FaultyRepository {
    async fn insert(&self, node: FileNode) -> Result<FileNode, DriveError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(DriveError::persistence("injected insert failure"));
        }
        self.inner.insert(node).await
    }

    async fn get_by_id(&self, id: FileId) -> Result<Option<FileNode>, DriveError> {
        self.inner.get_by_id(id).await
    }

    async fn list_children(
        &self,
        owner: UserId,
        parent: Option<FileId>,
    ) -> Result<Vec<FileNode>, DriveError> {
        self.inner.list_children(owner, parent).await
    }

    async fn count_children(
        &self,
        owner: UserId,
        parent: Option<FileId>,
    ) -> Result<u64, DriveError> {
        self.inner.count_children(owner, parent).await
    }

    async fn list_children_paged(
        &self,
        owner: UserId,
        parent: Option<FileId>,
        offset: u64,
        limit: u64,
        sort: &[SortKey],
    ) -> Result<Vec<FileNode>, DriveError> {
        self.inner
            .list_children_paged(owner, parent, offset, limit, sort)
            .await
    }

    async fn count_by_name(&self, owner: UserId, substring: &str) -> Result<u64, DriveError> {
        self.inner.count_by_name(owner, substring).await
    }

    async fn search_by_name(
        &self,
        owner: UserId,
        substring: &str,
        offset: u64,
        limit: u64,
        sort: &[SortKey],
    ) -> Result<Vec<FileNode>, DriveError> {
        self.inner
            .search_by_name(owner, substring, offset, limit, sort)
            .await
    }

    async fn update(&self, node: FileNode) -> Result<FileNode, DriveError> {
        let allowed = self
            .updates_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                match left {
                    usize::MAX => Some(usize::MAX),
                    0 => None,
                    n => Some(n - 1),
                }
            })
            .is_ok();
        if !allowed {
            return Err(DriveError::persistence("injected update failure"));
        }
        self.inner.update(node).await
    }

    async fn delete(&self, id: FileId) -> Result<bool, DriveError> {
        self.inner.delete(id).await
    }
}

pub type TestDrive = DriveService<FaultyRepository, FaultyBlobStore>;

/// A drive over fresh fault-injecting stores, plus handles to those stores.
pub fn drive_with(config: DriveConfig) -> (TestDrive, FaultyRepository, FaultyBlobStore) {
    let repo = FaultyRepository::new();
    let blobs = FaultyBlobStore::new();
    let drive = DriveService::new(Arc::new(repo.clone()), Arc::new(blobs.clone()), config);
    (drive, repo, blobs)
}

pub fn drive() -> (TestDrive, FaultyRepository, FaultyBlobStore) {
    drive_with(DriveConfig::default())
}
