//! Storage service implementation using Apache OpenDAL.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use cumulus_shared::StorageProvider;
use opendal::{Operator, services};
use tracing::debug;

use super::blob::{BlobStore, PresignedUrl};
use super::config::StorageConfig;
use super::error::StorageError;

/// Blob store over the configured OpenDAL backend.
#[derive(Debug, Clone)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                Operator::new(services::Fs::default().root(root))
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Oss {
                endpoint,
                bucket,
                access_key_id,
                access_key_secret,
            } => {
                let builder = services::Oss::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .access_key_secret(access_key_secret);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };
        Ok(operator)
    }

    /// Run one OpenDAL call under the configured deadline.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        key: &str,
        call: impl Future<Output = opendal::Result<T>>,
    ) -> Result<T, StorageError> {
        match tokio::time::timeout(self.config.op_timeout, call).await {
            Ok(result) => result.map_err(|e| StorageError::from_opendal(key, &e)),
            Err(_) => Err(StorageError::timeout(operation, self.config.op_timeout)),
        }
    }

    /// Check if an object exists in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.bounded("stat", key, self.operator.exists(key)).await
    }

    /// Get the bucket name, or the root directory for local storage.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl BlobStore for StorageService {
    async fn put(&self, key: &str, content: Bytes) -> Result<(), StorageError> {
        let size = content.len();
        self.bounded("write", key, self.operator.write(key, content))
            .await?;
        debug!(key, size, provider = self.provider_name(), "Blob written");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let buffer = self.bounded("read", key, self.operator.read(key)).await?;
        Ok(buffer.to_bytes())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.bounded("delete", key, self.operator.delete(key))
            .await?;
        debug!(key, provider = self.provider_name(), "Blob deleted");
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<PresignedUrl, StorageError> {
        let expires_at =
            Utc::now() + chrono::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));

        // The filesystem cannot sign requests; hand out a direct path instead.
        if let StorageProvider::LocalFs { root } = &self.config.provider {
            return Ok(PresignedUrl {
                url: local_file_url(root, key)?,
                method: "GET".to_string(),
                expires_at,
            });
        }

        let presigned = self
            .bounded("presign", key, self.operator.presign_read(key, ttl))
            .await?;

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            expires_at,
        })
    }

    fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }
}

/// Build a `file://` URL for `key` under `root`.
fn local_file_url(root: &Path, key: &str) -> Result<String, StorageError> {
    let root = std::path::absolute(root)
        .map_err(|e| StorageError::configuration(format!("invalid local root: {e}")))?;
    Ok(format!("file://{}", root.join(key).display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_service() -> StorageService {
        StorageService::from_config(StorageConfig::new(StorageProvider::Memory))
            .expect("should create service")
    }

    #[tokio::test]
    async fn test_put_get_delete_roundtrip() {
        let service = memory_service();

        service
            .put("u1/f1", Bytes::from_static(b"hello"))
            .await
            .expect("put");
        assert!(service.exists("u1/f1").await.expect("stat"));

        let content = service.get("u1/f1").await.expect("get");
        assert_eq!(content.as_ref(), b"hello");

        service.delete("u1/f1").await.expect("delete");
        assert!(!service.exists("u1/f1").await.expect("stat"));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_not_found() {
        let service = memory_service();
        let err = service.get("nope").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { ref key } if key == "nope"));
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_idempotent() {
        let service = memory_service();
        service.delete("never-written").await.expect("first delete");
        service.delete("never-written").await.expect("second delete");
    }

    #[tokio::test]
    async fn test_put_same_key_twice_keeps_content() {
        let service = memory_service();
        service.put("k", Bytes::from_static(b"abc")).await.expect("put");
        service.put("k", Bytes::from_static(b"abc")).await.expect("put again");
        assert_eq!(service.get("k").await.expect("get").as_ref(), b"abc");
    }

    #[tokio::test]
    async fn test_memory_backend_cannot_presign() {
        let service = memory_service();
        let err = service
            .signed_url("k", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::PresignNotSupported));
    }

    #[tokio::test]
    async fn test_local_fs_backend_roundtrip_and_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service =
            StorageService::from_config(StorageConfig::new(StorageProvider::local_fs(dir.path())))
                .expect("should create service");

        service
            .put("owner/file", Bytes::from_static(b"on disk"))
            .await
            .expect("put");
        assert!(dir.path().join("owner").join("file").exists());

        let url = service
            .signed_url("owner/file", Duration::from_secs(600))
            .await
            .expect("url");
        assert!(url.url.starts_with("file://"));
        assert!(url.url.ends_with("owner/file"));
        assert_eq!(url.method, "GET");
        assert!(url.expires_at > Utc::now());
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(memory_service().provider_name(), "memory");
        assert_eq!(memory_service().bucket(), "memory");
    }
}
