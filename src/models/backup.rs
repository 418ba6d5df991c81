use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validators::TRIGGER_REGEX;
use crate::config::JobConfig;

/// Catalog entry for one backup artifact stored in a remote object store.
///
/// `(bucket, filename)` identifies the remote object; this record is the
/// only reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: Uuid,
    /// Logical job key. Retention is evaluated per trigger.
    pub trigger: String,
    /// Mechanism that produced the artifact.
    pub adapter: String,
    /// Object key inside the bucket.
    pub filename: String,
    pub bucket: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBackupRecord {
    /// Job name (alphanumeric plus `.`, `_` and `-`)
    #[validate(length(min = 1, max = 128), regex(path = *TRIGGER_REGEX))]
    pub trigger: String,
    #[validate(length(min = 1, max = 64))]
    pub adapter: String,
    /// Object key
    #[validate(length(min = 1, max = 1024))]
    pub filename: String,
    #[validate(length(min = 1, max = 255))]
    pub bucket: String,
    /// Insert time override. Defaults to now; set when importing an existing
    /// catalog so ordering reflects when the artifact was really produced.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A finished upload, as reported by whatever produced it.
///
/// Read once when the record is saved. `keep_backups` travels with the upload
/// rather than the record: it governs the retention pass that follows this
/// save and is never persisted.
#[derive(Debug, Clone)]
pub struct UploadedArtifact {
    pub trigger: String,
    pub adapter: String,
    /// Final object key of the uploaded artifact.
    pub final_file: String,
    pub bucket: String,
    /// `None` disables retention for this save.
    pub keep_backups: Option<u32>,
}

impl UploadedArtifact {
    /// Describe an upload performed by a configured job.
    pub fn from_job(trigger: &str, job: &JobConfig, final_file: impl Into<String>) -> Self {
        Self {
            trigger: trigger.to_string(),
            adapter: job.adapter.clone(),
            final_file: final_file.into(),
            bucket: job.bucket.clone(),
            keep_backups: job.keep_backups,
        }
    }

    pub fn to_create_input(&self) -> CreateBackupRecord {
        CreateBackupRecord {
            trigger: self.trigger.clone(),
            adapter: self.adapter.clone(),
            filename: self.final_file.clone(),
            bucket: self.bucket.clone(),
            created_at: None,
        }
    }
}

/// Per-trigger catalog summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerSummary {
    pub trigger: String,
    pub count: i64,
    pub latest_at: DateTime<Utc>,
}
