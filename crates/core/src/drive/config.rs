//! Drive engine configuration.

use std::time::Duration;

use cumulus_shared::{DriveSettings, StorageSettings};

use super::error::DriveError;
use super::sort::{SortField, SortKey, SortSpec};

/// How `rename` treats a sibling that already has the new name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenamePolicy {
    /// Rename regardless of siblings.
    #[default]
    AllowDuplicates,
    /// Fail with `NameConflict` if any sibling has the name.
    RejectConflicts,
}

/// Drive engine configuration.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Sibling collision handling for renames.
    pub rename_policy: RenamePolicy,
    /// Fields callers may sort by.
    pub sort_fields: Vec<SortField>,
    /// Sort used when the caller passes an empty spec.
    pub default_sort: SortSpec,
    /// Largest accepted upload in bytes.
    pub max_upload_size: u64,
    /// Lifetime of signed download URLs.
    pub signed_url_ttl: Duration,
}

impl DriveConfig {
    /// Default max upload size: 100MB.
    pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;
    /// Default signed URL lifetime: 1 hour.
    pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

    /// Build from the application's drive and storage settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSort` if the configured sort fields or default sort are invalid.
    pub fn from_settings(
        drive: &DriveSettings,
        storage: &StorageSettings,
    ) -> Result<Self, DriveError> {
        let sort_fields = drive
            .sort_fields
            .iter()
            .map(|field| field.parse())
            .collect::<Result<Vec<SortField>, _>>()?;
        let default_sort = SortSpec::parse(&drive.default_sort, &sort_fields)?;

        Ok(Self {
            rename_policy: if drive.reject_rename_conflicts {
                RenamePolicy::RejectConflicts
            } else {
                RenamePolicy::AllowDuplicates
            },
            sort_fields,
            default_sort,
            max_upload_size: storage.max_file_size,
            signed_url_ttl: Duration::from_secs(storage.signed_url_ttl_secs),
        })
    }

    /// Set the rename policy.
    #[must_use]
    pub fn with_rename_policy(mut self, policy: RenamePolicy) -> Self {
        self.rename_policy = policy;
        self
    }

    /// Set the maximum upload size.
    #[must_use]
    pub fn with_max_upload_size(mut self, size: u64) -> Self {
        self.max_upload_size = size;
        self
    }

    /// Parse a caller sort spec against the allow-list; blank means the default.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSort` if the spec is malformed or names a disallowed field.
    pub fn sort_spec(&self, spec: &str) -> Result<SortSpec, DriveError> {
        if spec.trim().is_empty() {
            return Ok(self.default_sort.clone());
        }
        SortSpec::parse(spec, &self.sort_fields)
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            rename_policy: RenamePolicy::default(),
            sort_fields: vec![
                SortField::Name,
                SortField::UpdatedAt,
                SortField::CreatedAt,
                SortField::Size,
            ],
            default_sort: SortSpec::from_keys(vec![SortKey::asc(SortField::Name)]),
            max_upload_size: Self::DEFAULT_MAX_UPLOAD_SIZE,
            signed_url_ttl: Self::DEFAULT_SIGNED_URL_TTL,
        }
    }
}
