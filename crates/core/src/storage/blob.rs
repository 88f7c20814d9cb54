//! Blob store contract.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::error::StorageError;

/// URL that grants time-limited, out-of-band access to one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUrl {
    /// The signed URL.
    pub url: String,
    /// HTTP method to use with the URL.
    pub method: String,
    /// When the URL stops working.
    pub expires_at: DateTime<Utc>,
}

/// Key-addressed content store.
///
/// Writes of the same key with the same content and deletes of an absent key
/// must both succeed, so callers may retry any call.
pub trait BlobStore: Send + Sync {
    /// Store `content` under `key`, replacing any previous object.
    fn put(
        &self,
        key: &str,
        content: Bytes,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Fetch the full object stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Bytes, StorageError>> + Send;

    /// Remove the object stored under `key`. Absent keys are not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Produce a URL usable for `ttl` to download the object.
    fn signed_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<PresignedUrl, StorageError>> + Send;

    /// Short provider name, e.g. `s3`.
    fn provider_name(&self) -> &'static str;
}
