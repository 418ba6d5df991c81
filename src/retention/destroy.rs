use tracing::{debug, info, warn};

use super::RetentionError;
use crate::{db::BackupRepo, models::BackupRecord, storage::ObjectStoreSession};

/// Destroy each backup in order: remote object first, then its catalog row.
///
/// An object that is already gone counts as deleted. Any other remote
/// failure stops the loop with the failing row still in the catalog and the
/// remaining backups untouched. Returns how many were destroyed.
pub(crate) async fn destroy_backups(
    session: &dyn ObjectStoreSession,
    repo: &dyn BackupRepo,
    backups: &[BackupRecord],
) -> Result<usize, RetentionError> {
    let mut purged = 0;

    for backup in backups {
        match session.delete(&backup.bucket, &backup.filename).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                warn!(
                    filename = %backup.filename,
                    bucket = %backup.bucket,
                    "Remote object already absent, removing catalog entry"
                );
            }
            Err(source) => {
                return Err(RetentionError::RemoteDelete {
                    record_id: backup.id,
                    bucket: backup.bucket.clone(),
                    key: backup.filename.clone(),
                    purged,
                    source,
                });
            }
        }

        let removed = repo
            .delete(backup.id)
            .await
            .map_err(|source| RetentionError::Catalog { purged, source })?;
        if !removed {
            debug!(record_id = %backup.id, "Catalog entry was already removed");
        }

        purged += 1;
        info!(
            filename = %backup.filename,
            bucket = %backup.bucket,
            backend = session.backend_name(),
            "Destroyed backup"
        );
    }

    Ok(purged)
}
