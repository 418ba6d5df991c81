//! Remote object store connectors.
//!
//! Retention and purge passes open one session per pass through an
//! [`ObjectStoreConnector`] and delete objects by `(bucket, key)`:
//!
//! - **Filesystem**: buckets are directories under a configured root
//! - **S3**: AWS S3 and S3-compatible services (`s3-storage` feature)
//!
//! A delete that fails because the object is already gone is reported as
//! [`ObjectStoreError::NotFound`] so callers can treat it as done.

mod filesystem;
#[cfg(feature = "s3-storage")]
mod s3;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
pub use filesystem::FilesystemSession;
#[cfg(feature = "s3-storage")]
pub use s3::S3Session;
use thiserror::Error;

use crate::config::{ObjectStoreBackend, ObjectStoreConfig};

/// Errors that can occur talking to a remote object store.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("Failed to connect to {backend} object store: {message}")]
    Connect {
        backend: &'static str,
        message: String,
    },

    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The bucket itself is missing. Never treated as an already-deleted object.
    #[error("Bucket not found: {bucket}")]
    BucketNotFound { bucket: String },

    #[error("Permission denied for {bucket}/{key}: {message}")]
    PermissionDenied {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Invalid object location '{0}'")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),
}

impl ObjectStoreError {
    /// The object was already absent. Deleting it again is a no-op.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ObjectStoreError::NotFound { .. })
    }
}

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// An open session against a remote object store.
#[async_trait]
pub trait ObjectStoreSession: Send + Sync {
    /// Delete one object.
    async fn delete(&self, bucket: &str, key: &str) -> ObjectStoreResult<()>;

    /// Get the backend type name (for logging/debugging).
    fn backend_name(&self) -> &'static str;
}

/// Opens object store sessions from connection configuration.
#[async_trait]
pub trait ObjectStoreConnector: Send + Sync {
    /// Establish a session. Bad credentials, unreachable endpoints and unusable
    /// configuration all surface as [`ObjectStoreError::Connect`].
    async fn connect(
        &self,
        config: &ObjectStoreConfig,
    ) -> ObjectStoreResult<Box<dyn ObjectStoreSession>>;
}

/// Connector that dispatches on the configured backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConnector;

#[async_trait]
impl ObjectStoreConnector for DefaultConnector {
    async fn connect(
        &self,
        config: &ObjectStoreConfig,
    ) -> ObjectStoreResult<Box<dyn ObjectStoreSession>> {
        match config.backend {
            ObjectStoreBackend::Filesystem => {
                let fs = config
                    .filesystem
                    .as_ref()
                    .ok_or_else(|| ObjectStoreError::Connect {
                        backend: "filesystem",
                        message: "filesystem backend requires [object_store.filesystem]"
                            .to_string(),
                    })?;
                Ok(Box::new(FilesystemSession::connect(fs).await?))
            }
            #[cfg(feature = "s3-storage")]
            ObjectStoreBackend::S3 => {
                let s3 = config.s3.clone().unwrap_or_default();
                Ok(Box::new(S3Session::connect(&s3).await?))
            }
            #[cfg(not(feature = "s3-storage"))]
            ObjectStoreBackend::S3 => Err(ObjectStoreError::Connect {
                backend: "s3",
                message: "S3 support requires the 's3-storage' feature".to_string(),
            }),
        }
    }
}
