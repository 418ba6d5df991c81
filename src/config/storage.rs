//! Remote object store connection configuration.
//!
//! This is the connection half of a job's storage settings. The bucket and
//! object key belong to each backup record, so nothing here names a bucket.
//!
//! # Example Configuration
//!
//! ```toml
//! [object_store]
//! backend = "s3"
//!
//! [object_store.s3]
//! region = "us-east-1"
//! # Credentials via env vars AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY
//! # or instance role when omitted
//!
//! [object_store.filesystem]
//! root = "/var/backups"
//! ```

use serde::{Deserialize, Serialize};

/// Connection settings for the remote object store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectStoreConfig {
    /// Which backend to connect to.
    #[serde(default)]
    pub backend: ObjectStoreBackend,

    /// S3 configuration (used when backend = "s3").
    #[serde(default)]
    pub s3: Option<S3StoreConfig>,

    /// Filesystem configuration (required when backend = "filesystem").
    #[serde(default)]
    pub filesystem: Option<FilesystemStoreConfig>,
}

impl ObjectStoreConfig {
    /// Validate the object store configuration.
    pub fn validate(&self) -> Result<(), String> {
        match self.backend {
            ObjectStoreBackend::S3 => match &self.s3 {
                Some(s3) => s3.validate(),
                None => Ok(()),
            },
            ObjectStoreBackend::Filesystem => match &self.filesystem {
                Some(fs) => fs.validate(),
                None => Ok(()),
            },
        }
    }
}

/// Object store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStoreBackend {
    /// Buckets are directories under a local or mounted root.
    #[default]
    Filesystem,

    /// AWS S3 or an S3-compatible service (MinIO, R2, Spaces, ...).
    /// Requires the `s3-storage` feature.
    S3,
}

/// S3-compatible object store connection settings.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct S3StoreConfig {
    /// AWS region (e.g., "us-east-1").
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible services.
    /// Examples:
    /// - MinIO: "http://localhost:9000"
    /// - R2: "https://<account-id>.r2.cloudflarestorage.com"
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Access key ID. Falls back to the default AWS credential chain.
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Secret access key. Falls back to the default AWS credential chain.
    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Use path-style URLs instead of virtual-hosted style.
    /// Required for MinIO and some S3-compatible services.
    #[serde(default)]
    pub force_path_style: bool,
}

impl std::fmt::Debug for S3StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3StoreConfig")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field(
                "access_key_id",
                &self.access_key_id.as_ref().map(|_| "****"),
            )
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "****"),
            )
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl S3StoreConfig {
    /// Validate S3 configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(
                "S3 access_key_id and secret_access_key must be set together".to_string(),
            );
        }
        if let Some(endpoint) = &self.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(format!("S3 endpoint must be an http(s) URL, got '{endpoint}'"));
        }
        Ok(())
    }
}

/// Filesystem object store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesystemStoreConfig {
    /// Root directory. Objects live at `{root}/{bucket}/{key}`.
    pub root: String,
}

impl FilesystemStoreConfig {
    /// Validate filesystem configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.root.is_empty() {
            return Err("Filesystem object store root cannot be empty".to_string());
        }
        Ok(())
    }
}
