use thiserror::Error;
use uuid::Uuid;

use crate::{db::DbError, storage::ObjectStoreError};

/// Failure of a retention or purge pass.
///
/// Every variant reports how many backups were fully destroyed before the
/// pass stopped. Those stay destroyed; the rest are picked up again by the
/// next pass for the trigger.
#[derive(Debug, Error)]
pub enum RetentionError {
    #[error("Failed to connect to object store for trigger '{trigger}': {source}")]
    Connect {
        trigger: String,
        #[source]
        source: ObjectStoreError,
    },

    #[error(
        "Failed to delete {bucket}/{key} (record {record_id}) after destroying {purged} backups: {source}"
    )]
    RemoteDelete {
        record_id: Uuid,
        bucket: String,
        key: String,
        purged: usize,
        #[source]
        source: ObjectStoreError,
    },

    #[error("Catalog error after destroying {purged} backups: {source}")]
    Catalog {
        purged: usize,
        #[source]
        source: DbError,
    },
}

impl RetentionError {
    /// Backups destroyed before the failure.
    pub fn purged(&self) -> usize {
        match self {
            RetentionError::Connect { .. } => 0,
            RetentionError::RemoteDelete { purged, .. } | RetentionError::Catalog { purged, .. } => {
                *purged
            }
        }
    }
}
