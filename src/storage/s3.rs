use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use tracing::{debug, error, info, instrument};

use super::{ObjectStoreError, ObjectStoreResult, ObjectStoreSession};
use crate::config::S3StoreConfig;

/// S3-compatible object store session.
///
/// Works against:
/// - AWS S3
/// - MinIO
/// - Cloudflare R2
/// - Any S3-compatible service
///
/// Requires the `s3-storage` feature.
pub struct S3Session {
    client: aws_sdk_s3::Client,
}

impl S3Session {
    /// Build a client and resolve credentials.
    ///
    /// Credentials come from the config when both keys are set, otherwise
    /// from the default AWS chain (env, profile, instance role). Failing to
    /// resolve them is a connect failure.
    pub async fn connect(config: &S3StoreConfig) -> ObjectStoreResult<Self> {
        info!(
            region = ?config.region,
            endpoint = ?config.endpoint,
            "Connecting to S3 object store"
        );

        let mut sdk_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            sdk_config_builder = sdk_config_builder.region(aws_config::Region::new(region.clone()));
        }

        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = aws_credential_types::Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None, // session token
                None, // expiry
                "cairn-config",
            );
            sdk_config_builder = sdk_config_builder.credentials_provider(credentials);
        }

        let sdk_config = sdk_config_builder.load().await;

        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| ObjectStoreError::Connect {
                backend: "s3",
                message: "no AWS credentials provider available".to_string(),
            })?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| ObjectStoreError::Connect {
                backend: "s3",
                message: format!("failed to resolve credentials: {}", DisplayErrorContext(&e)),
            })?;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = aws_sdk_s3::Client::from_conf(s3_config_builder.build());

        Ok(Self { client })
    }
}

#[async_trait]
impl ObjectStoreSession for S3Session {
    #[instrument(skip(self))]
    async fn delete(&self, bucket: &str, key: &str) -> ObjectStoreResult<()> {
        debug!("Deleting object from S3");

        match self
            .client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = classify_error(e.code(), DisplayErrorContext(&e).to_string(), bucket, key);
                if !err.is_not_found() {
                    error!(error = %err, "Failed to delete from S3");
                }
                Err(err)
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

/// Map an S3 error code onto the connector's failure kinds.
///
/// `NoSuchBucket` stays a real failure: a missing bucket means the
/// configuration is wrong, not that the object was already removed.
fn classify_error(code: Option<&str>, message: String, bucket: &str, key: &str) -> ObjectStoreError {
    match code {
        Some("NoSuchKey") | Some("NotFound") => ObjectStoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        Some("NoSuchBucket") => ObjectStoreError::BucketNotFound {
            bucket: bucket.to_string(),
        },
        Some("AccessDenied")
        | Some("AllAccessDisabled")
        | Some("InvalidAccessKeyId")
        | Some("SignatureDoesNotMatch")
        | Some("ExpiredToken") => ObjectStoreError::PermissionDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        },
        _ => ObjectStoreError::S3(message),
    }
}
