//! Application configuration management.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Drive behaviour configuration.
    #[serde(default)]
    pub drive: DriveSettings,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when opening a new connection.
    #[serde(default = "default_db_timeout")]
    pub connect_timeout_secs: u64,
    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_db_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_db_timeout() -> u64 {
    8
}

/// Storage provider configuration.
///
/// Exactly one provider is active per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// Local filesystem rooted at a directory.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// S3-compatible storage: MinIO, AWS S3, Cloudflare R2
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Aliyun Object Storage Service
    Oss {
        /// OSS endpoint URL.
        endpoint: String,
        /// OSS bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Access key secret.
        access_key_secret: String,
    },
    /// Process-local memory store (development and tests only)
    Memory,
}

impl StorageProvider {
    /// Create a local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Create an S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create an Aliyun OSS provider.
    #[must_use]
    pub fn oss(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> Self {
        Self::Oss {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
        }
    }

    /// Get the provider name recorded alongside stored content.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LocalFs { .. } => "local",
            Self::S3 { .. } => "s3",
            Self::Oss { .. } => "oss",
            Self::Memory => "memory",
        }
    }

    /// Get the bucket name, or the root directory for local storage.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } | Self::Oss { bucket, .. } => bucket,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }
}

impl Default for StorageProvider {
    fn default() -> Self {
        Self::local_fs("./storage_data")
    }
}

/// Blob storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Active storage provider.
    #[serde(default)]
    pub provider: StorageProvider,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Signed URL lifetime in seconds.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,
    /// Deadline for a single storage call in seconds.
    #[serde(default = "default_op_timeout")]
    pub op_timeout_secs: u64,
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024
}

fn default_signed_url_ttl() -> u64 {
    3600 // 1 hour
}

fn default_op_timeout() -> u64 {
    30
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            max_file_size: default_max_file_size(),
            signed_url_ttl_secs: default_signed_url_ttl(),
            op_timeout_secs: default_op_timeout(),
        }
    }
}

/// Drive behaviour settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveSettings {
    /// Reject renames that collide with an existing sibling name.
    #[serde(default)]
    pub reject_rename_conflicts: bool,
    /// Fields callers may sort listings by.
    #[serde(default = "default_sort_fields")]
    pub sort_fields: Vec<String>,
    /// Sort applied when the caller passes none.
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

fn default_sort_fields() -> Vec<String> {
    ["name", "updated_at", "created_at", "size"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_sort() -> String {
    "name:asc".to_string()
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            reject_rename_conflicts: false,
            sort_fields: default_sort_fields(),
            default_sort: default_sort(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CUMULUS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_provider_names() {
        assert_eq!(StorageProvider::local_fs("./data").name(), "local");
        assert_eq!(
            StorageProvider::s3("http://minio:9000", "drive", "ak", "sk", "us-east-1").name(),
            "s3"
        );
        assert_eq!(
            StorageProvider::oss("https://oss-cn-hangzhou.aliyuncs.com", "drive", "ak", "sk")
                .name(),
            "oss"
        );
        assert_eq!(StorageProvider::Memory.name(), "memory");
    }

    #[test]
    fn test_storage_provider_bucket() {
        let provider = StorageProvider::oss("https://oss.example.com", "files", "ak", "sk");
        assert_eq!(provider.bucket(), "files");
        assert_eq!(StorageProvider::local_fs("./data").bucket(), "./data");
    }

    #[test]
    fn test_storage_provider_deserialize_tagged() {
        let provider: StorageProvider =
            serde_json::from_str(r#"{"type":"local_fs","root":"/srv/blobs"}"#).unwrap();
        assert_eq!(provider, StorageProvider::local_fs("/srv/blobs"));

        let provider: StorageProvider = serde_json::from_str(r#"{"type":"memory"}"#).unwrap();
        assert_eq!(provider, StorageProvider::Memory);
    }

    #[test]
    fn test_drive_settings_defaults() {
        let settings = DriveSettings::default();
        assert!(!settings.reject_rename_conflicts);
        assert_eq!(settings.default_sort, "name:asc");
        assert!(settings.sort_fields.iter().any(|f| f == "updated_at"));
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("CUMULUS__DATABASE__URL", Some("sqlite::memory:")),
                ("CUMULUS__STORAGE__PROVIDER__TYPE", Some("memory")),
                ("CUMULUS__STORAGE__MAX_FILE_SIZE", Some("2048")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.storage.provider, StorageProvider::Memory);
                assert_eq!(config.storage.max_file_size, 2048);
                assert_eq!(config.storage.signed_url_ttl_secs, 3600);
                assert_eq!(config.drive.default_sort, "name:asc");
            },
        );
    }
}
