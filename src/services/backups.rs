use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    config::ObjectStoreConfig,
    db::{DbError, DbPool, SortOrder},
    models::{BackupRecord, TriggerSummary, UploadedArtifact},
    retention::{
        BulkPurger, PurgeReport, RetentionEnforcer, RetentionError, RetentionReport, TriggerLocks,
    },
    storage::ObjectStoreConnector,
};

/// Errors that can occur in the BackupService.
#[derive(Debug, Error)]
pub enum BackupServiceError {
    #[error("Invalid backup record: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// The record is committed; only the retention pass that followed failed.
    #[error("Backup {} was saved but retention failed: {source}", record.id)]
    Retention {
        record: Box<BackupRecord>,
        #[source]
        source: RetentionError,
    },

    /// A prune or purge pass failed.
    #[error(transparent)]
    Pass(#[from] RetentionError),
}

pub type BackupServiceResult<T> = Result<T, BackupServiceError>;

/// A saved record and the retention pass it triggered.
#[derive(Debug, Clone)]
pub struct RecordedBackup {
    pub record: BackupRecord,
    pub retention: RetentionReport,
}

/// Service layer for the backup catalog.
///
/// Saving a backup is an explicit two-step sequence: insert the record, then
/// enforce retention for its trigger before returning.
#[derive(Clone)]
pub struct BackupService {
    db: Arc<DbPool>,
    enforcer: Arc<RetentionEnforcer>,
    purger: Arc<BulkPurger>,
}

impl BackupService {
    pub fn new(db: Arc<DbPool>, connector: Arc<dyn ObjectStoreConnector>) -> Self {
        let locks = TriggerLocks::new();
        Self {
            enforcer: Arc::new(RetentionEnforcer::new(
                db.backups(),
                Arc::clone(&connector),
                locks.clone(),
            )),
            purger: Arc::new(BulkPurger::new(db.backups(), connector, locks)),
            db,
        }
    }

    /// Record a completed upload and enforce its job's retention.
    #[instrument(skip(self, artifact, connection), fields(
        trigger = %artifact.trigger,
        filename = %artifact.final_file,
        bucket = %artifact.bucket,
    ))]
    pub async fn record(
        &self,
        artifact: &UploadedArtifact,
        connection: &ObjectStoreConfig,
    ) -> BackupServiceResult<RecordedBackup> {
        let input = artifact.to_create_input();
        input.validate()?;

        let record = self.db.backups().create(input).await?;
        info!(record_id = %record.id, "Backup recorded");

        match self
            .enforcer
            .enforce(&record, artifact.keep_backups, connection)
            .await
        {
            Ok(retention) => Ok(RecordedBackup { record, retention }),
            Err(source) => {
                warn!(
                    record_id = %record.id,
                    purged = source.purged(),
                    error = %source,
                    "Retention failed after save"
                );
                Err(BackupServiceError::Retention {
                    record: Box::new(record),
                    source,
                })
            }
        }
    }

    /// List backups for a trigger, newest first.
    pub async fn list(&self, trigger: &str) -> BackupServiceResult<Vec<BackupRecord>> {
        Ok(self
            .db
            .backups()
            .list_by_trigger(trigger, SortOrder::Desc)
            .await?)
    }

    /// Per-trigger counts across the catalog.
    pub async fn triggers(&self) -> BackupServiceResult<Vec<TriggerSummary>> {
        Ok(self.db.backups().list_triggers().await?)
    }

    /// Re-run retention for a trigger without a new upload.
    ///
    /// The pass is anchored on the newest stored record, exactly as if it
    /// had just been saved. Used to finish a pass that stopped on an error.
    #[instrument(skip(self, connection))]
    pub async fn prune(
        &self,
        trigger: &str,
        keep_backups: Option<u32>,
        connection: &ObjectStoreConfig,
    ) -> BackupServiceResult<RetentionReport> {
        let newest = self
            .db
            .backups()
            .list_by_trigger(trigger, SortOrder::Desc)
            .await?
            .into_iter()
            .next();

        let Some(newest) = newest else {
            return Ok(RetentionReport {
                trigger: trigger.to_string(),
                keep_backups,
                total: 0,
                purged: 0,
            });
        };

        Ok(self
            .enforcer
            .enforce(&newest, keep_backups, connection)
            .await?)
    }

    /// Destroy every backup for a trigger.
    pub async fn destroy_all(
        &self,
        trigger: &str,
        connection: &ObjectStoreConfig,
    ) -> BackupServiceResult<PurgeReport> {
        Ok(self.purger.destroy_all_backups(connection, trigger).await?)
    }
}
