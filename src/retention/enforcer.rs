use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::{RetentionError, TriggerLocks, destroy::destroy_backups, policy::select_victims};
use crate::{
    config::ObjectStoreConfig,
    db::{BackupRepo, SortOrder},
    models::BackupRecord,
    storage::ObjectStoreConnector,
};

/// Outcome of one enforcement pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetentionReport {
    pub trigger: String,
    /// Limit applied by the pass. `None` means retention was disabled.
    pub keep_backups: Option<u32>,
    /// Records for the trigger when the pass started.
    pub total: usize,
    /// Backups destroyed from both stores.
    pub purged: usize,
}

impl RetentionReport {
    pub fn is_disabled(&self) -> bool {
        self.keep_backups.is_none()
    }

    pub fn remaining(&self) -> usize {
        self.total - self.purged
    }
}

/// Keeps only the newest `keep_backups` records for a trigger.
///
/// Runs right after a record is saved. The limit comes from the save, not
/// from the stored records, so the most recent save decides each pass.
pub struct RetentionEnforcer {
    repo: Arc<dyn BackupRepo>,
    connector: Arc<dyn ObjectStoreConnector>,
    locks: TriggerLocks,
}

impl RetentionEnforcer {
    pub fn new(
        repo: Arc<dyn BackupRepo>,
        connector: Arc<dyn ObjectStoreConnector>,
        locks: TriggerLocks,
    ) -> Self {
        Self {
            repo,
            connector,
            locks,
        }
    }

    /// Enforce retention for the trigger of a just-saved record.
    ///
    /// Opens at most one object store session, and only when there is
    /// something to delete. Stops at the first real failure.
    #[instrument(
        skip(self, record, connection),
        fields(trigger = %record.trigger, record_id = %record.id)
    )]
    pub async fn enforce(
        &self,
        record: &BackupRecord,
        keep_backups: Option<u32>,
        connection: &ObjectStoreConfig,
    ) -> Result<RetentionReport, RetentionError> {
        let trigger = record.trigger.as_str();

        let Some(keep) = keep_backups else {
            debug!("Retention disabled for trigger");
            return Ok(RetentionReport {
                trigger: trigger.to_string(),
                keep_backups: None,
                total: 0,
                purged: 0,
            });
        };

        let _guard = self.locks.lock(trigger).await;

        let backups = self
            .repo
            .list_by_trigger(trigger, SortOrder::Desc)
            .await
            .map_err(|source| RetentionError::Catalog { purged: 0, source })?;
        let (_, victims) = select_victims(&backups, keep);

        let mut report = RetentionReport {
            trigger: trigger.to_string(),
            keep_backups: Some(keep),
            total: backups.len(),
            purged: 0,
        };

        if victims.is_empty() {
            debug!(
                total = backups.len(),
                keep_backups = keep,
                "Nothing to purge"
            );
            return Ok(report);
        }

        let session = self
            .connector
            .connect(connection)
            .await
            .map_err(|source| RetentionError::Connect {
                trigger: trigger.to_string(),
                source,
            })?;

        report.purged = destroy_backups(session.as_ref(), self.repo.as_ref(), victims).await?;

        info!(
            keep_backups = keep,
            purged = report.purged,
            remaining = report.remaining(),
            "Backup storage for trigger is limited to {} backups",
            keep
        );

        Ok(report)
    }
}
