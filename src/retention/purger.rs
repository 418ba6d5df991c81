use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use super::{RetentionError, TriggerLocks, destroy::destroy_backups};
use crate::{
    config::ObjectStoreConfig,
    db::{BackupRepo, SortOrder},
    storage::ObjectStoreConnector,
};

/// Outcome of a bulk purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub trigger: String,
    /// Records found for the trigger.
    pub requested: usize,
    /// Backups destroyed from both stores.
    pub purged: usize,
}

/// Destroys every backup for a trigger on operator request, ignoring any
/// retention limit.
pub struct BulkPurger {
    repo: Arc<dyn BackupRepo>,
    connector: Arc<dyn ObjectStoreConnector>,
    locks: TriggerLocks,
}

impl BulkPurger {
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

    /// Destroy all backups for `trigger`.
    ///
    /// An empty trigger makes no connector calls at all. Otherwise one
    /// session is opened and the purge stops at the first real failure.
    #[instrument(skip(self, connection))]
    pub async fn destroy_all_backups(
        &self,
        connection: &ObjectStoreConfig,
        trigger: &str,
    ) -> Result<PurgeReport, RetentionError> {
        let _guard = self.locks.lock(trigger).await;

        let backups = self
            .repo
            .list_by_trigger(trigger, SortOrder::Desc)
            .await
            .map_err(|source| RetentionError::Catalog { purged: 0, source })?;

        if backups.is_empty() {
            info!("No backups to destroy");
            return Ok(PurgeReport {
                trigger: trigger.to_string(),
                requested: 0,
                purged: 0,
            });
        }

        let session = self
            .connector
            .connect(connection)
            .await
            .map_err(|source| RetentionError::Connect {
                trigger: trigger.to_string(),
                source,
            })?;

        let purged = destroy_backups(session.as_ref(), self.repo.as_ref(), &backups).await?;

        info!(purged, "All backups for trigger destroyed");

        Ok(PurgeReport {
            trigger: trigger.to_string(),
            requested: backups.len(),
            purged,
        })
    }
}
