//! Storage configuration types.

use std::time::Duration;

use cumulus_shared::{StorageProvider, StorageSettings};

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Deadline applied to every individual storage call.
    pub op_timeout: Duration,
}

impl StorageConfig {
    /// Default per-call deadline: 30 seconds.
    pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            op_timeout: Self::DEFAULT_OP_TIMEOUT,
        }
    }

    /// Build from the application's storage settings.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.provider.clone())
            .with_op_timeout(Duration::from_secs(settings.op_timeout_secs))
    }

    /// Set the per-call deadline.
    #[must_use]
    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::new(StorageProvider::Memory);
        assert_eq!(config.op_timeout, StorageConfig::DEFAULT_OP_TIMEOUT);
    }

    #[test]
    fn test_storage_config_from_settings() {
        let settings = StorageSettings {
            provider: StorageProvider::local_fs("/srv/blobs"),
            op_timeout_secs: 5,
            ..StorageSettings::default()
        };
        let config = StorageConfig::from_settings(&settings);
        assert_eq!(config.provider, StorageProvider::local_fs("/srv/blobs"));
        assert_eq!(config.op_timeout, Duration::from_secs(5));
    }
}
