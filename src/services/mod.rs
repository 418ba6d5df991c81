mod backups;

use std::sync::Arc;

pub use backups::{BackupService, BackupServiceError, BackupServiceResult, RecordedBackup};

use crate::{db::DbPool, storage::ObjectStoreConnector};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub backups: BackupService,
}

impl Services {
    pub fn new(db: Arc<DbPool>, connector: Arc<dyn ObjectStoreConnector>) -> Self {
        Self {
            backups: BackupService::new(db, connector),
        }
    }
}
