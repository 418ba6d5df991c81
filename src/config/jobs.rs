use serde::{Deserialize, Serialize};

/// A backup job, keyed by its trigger name under `[jobs.<trigger>]`.
///
/// The job supplies the values a completed upload is recorded with: which
/// adapter produced it, which bucket it landed in, and how many artifacts
/// to keep for the trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Backup-producing mechanism (e.g. "postgresql", "archive").
    pub adapter: String,

    /// Bucket the job uploads to.
    pub bucket: String,

    /// Number of most recent backups to keep for this trigger.
    /// Omit to disable retention enforcement for the job.
    #[serde(default)]
    pub keep_backups: Option<u32>,
}

impl JobConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.adapter.trim().is_empty() {
            return Err("adapter cannot be empty".to_string());
        }
        if self.bucket.trim().is_empty() {
            return Err("bucket cannot be empty".to_string());
        }
        if self.keep_backups == Some(0) {
            tracing::warn!(
                bucket = %self.bucket,
                "keep_backups = 0 removes every backup for the job, including the newest"
            );
        }
        Ok(())
    }
}
