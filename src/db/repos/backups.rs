use async_trait::async_trait;
use uuid::Uuid;

use super::SortOrder;
use crate::{
    db::error::DbResult,
    models::{BackupRecord, CreateBackupRecord, TriggerSummary},
};

/// Repository trait for the backup metadata catalog.
#[async_trait]
pub trait BackupRepo: Send + Sync {
    /// Durably store a new record, assigning its id and creation time.
    async fn create(&self, input: CreateBackupRecord) -> DbResult<BackupRecord>;

    /// Get a record by ID
    async fn get(&self, id: Uuid) -> DbResult<Option<BackupRecord>>;

    /// List every record for a trigger ordered by `created_at`, ties broken by id.
    async fn list_by_trigger(&self, trigger: &str, order: SortOrder)
    -> DbResult<Vec<BackupRecord>>;

    async fn count_by_trigger(&self, trigger: &str) -> DbResult<i64>;

    /// Per-trigger counts, ordered by trigger name.
    async fn list_triggers(&self) -> DbResult<Vec<TriggerSummary>>;

    /// Delete a record. Returns `false` if it was already gone.
    async fn delete(&self, id: Uuid) -> DbResult<bool>;
}
