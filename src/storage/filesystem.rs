use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{ObjectStoreError, ObjectStoreResult, ObjectStoreSession};
use crate::config::FilesystemStoreConfig;

/// Filesystem object store session.
///
/// Objects are stored as `{root}/{bucket}/{key}`. Useful for NFS or other
/// mounted backup targets, and for local testing.
#[derive(Debug)]
pub struct FilesystemSession {
    root: PathBuf,
}

impl FilesystemSession {
    /// Open a session. The root directory must already exist.
    pub async fn connect(config: &FilesystemStoreConfig) -> ObjectStoreResult<Self> {
        let root = PathBuf::from(&config.root);

        match tokio::fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => {
                debug!(root = %root.display(), "Connected to filesystem object store");
                Ok(Self { root })
            }
            Ok(_) => Err(ObjectStoreError::Connect {
                backend: "filesystem",
                message: format!("{} is not a directory", root.display()),
            }),
            Err(e) => Err(ObjectStoreError::Connect {
                backend: "filesystem",
                message: format!("{}: {}", root.display(), e),
            }),
        }
    }

    /// Resolve `(bucket, key)` under the root, refusing anything that could
    /// escape it.
    fn object_path(&self, bucket: &str, key: &str) -> ObjectStoreResult<PathBuf> {
        for part in [bucket, key] {
            let path = Path::new(part);
            let escapes = part.is_empty()
                || path
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_)));
            if escapes {
                return Err(ObjectStoreError::InvalidKey(format!("{bucket}/{key}")));
            }
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectStoreSession for FilesystemSession {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn delete(&self, bucket: &str, key: &str) -> ObjectStoreResult<()> {
        let path = self.object_path(bucket, key)?;
        debug!(path = %path.display(), "Deleting object from filesystem");

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !tokio::fs::metadata(self.root.join(bucket))
                    .await
                    .is_ok_and(|meta| meta.is_dir())
                {
                    return Err(ObjectStoreError::BucketNotFound {
                        bucket: bucket.to_string(),
                    });
                }
                Err(ObjectStoreError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(ObjectStoreError::PermissionDenied {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
            Err(e) => Err(ObjectStoreError::Io(e)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
