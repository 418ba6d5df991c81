//! Catalog helpers for engine tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    db::{BackupRepo, DbError, DbResult, SortOrder},
    models::{BackupRecord, CreateBackupRecord, TriggerSummary},
};

/// Insert one record per filename, oldest first, an hour apart.
///
/// Each call continues after the newest record already stored for the
/// trigger so repeated seeding keeps chronological order.
pub async fn seed(repo: &dyn BackupRepo, trigger: &str, filenames: &[&str]) -> Vec<BackupRecord> {
    let existing = repo.list_by_trigger(trigger, SortOrder::Desc).await.unwrap();
    let start = existing
        .first()
        .map(|r| r.created_at + Duration::hours(1))
        .unwrap_or_else(|| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

    let mut records = Vec::with_capacity(filenames.len());
    for (i, filename) in filenames.iter().enumerate() {
        let record = repo
            .create(CreateBackupRecord {
                trigger: trigger.to_string(),
                adapter: "postgresql".to_string(),
                filename: filename.to_string(),
                bucket: "nightly".to_string(),
                created_at: Some(start + Duration::hours(i as i64)),
            })
            .await
            .unwrap();
        records.push(record);
    }
    records
}

/// Filenames for a trigger, newest first.
pub async fn filenames(repo: &dyn BackupRepo, trigger: &str) -> Vec<String> {
    repo.list_by_trigger(trigger, SortOrder::Desc)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.filename)
        .collect()
}

/// Catalog wrapper that fails a chosen delete call.
pub struct FlakyRepo {
    inner: Arc<dyn BackupRepo>,
    fail_delete_on: Option<usize>,
    deletes: AtomicUsize,
}

impl FlakyRepo {
    pub fn new(inner: Arc<dyn BackupRepo>) -> Self {
        Self {
            inner,
            fail_delete_on: None,
            deletes: AtomicUsize::new(0),
        }
    }

    /// Fail the `n`th delete (1-based).
    pub fn fail_delete(mut self, n: usize) -> Self {
        self.fail_delete_on = Some(n);
        self
    }
}

#[async_trait]
impl BackupRepo for FlakyRepo {
    async fn create(&self, input: CreateBackupRecord) -> DbResult<BackupRecord> {
        self.inner.create(input).await
    }

    async fn get(&self, id: Uuid) -> DbResult<Option<BackupRecord>> {
        self.inner.get(id).await
    }

    async fn list_by_trigger(
        &self,
        trigger: &str,
        order: SortOrder,
    ) -> DbResult<Vec<BackupRecord>> {
        self.inner.list_by_trigger(trigger, order).await
    }

    async fn count_by_trigger(&self, trigger: &str) -> DbResult<i64> {
        self.inner.count_by_trigger(trigger).await
    }

    async fn list_triggers(&self) -> DbResult<Vec<TriggerSummary>> {
        self.inner.list_triggers().await
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let n = self.deletes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_delete_on == Some(n) {
            return Err(DbError::Internal("database is locked".to_string()));
        }
        self.inner.delete(id).await
    }
}
