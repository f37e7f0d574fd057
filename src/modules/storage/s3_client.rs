//! S3-compatible storage client
//!
//! Stores image payloads, streams them back, and generates presigned GET
//! URLs for AWS S3 or any S3-compatible service (MinIO, R2, ...).
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use futures::TryStreamExt;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::object_storage::{ObjectStorage, StorageError, StoredObject};
use crate::core::config::StorageConfig;

/// Query parameter S3 uses to override `Content-Disposition` on presigned GETs
const RESPONSE_CONTENT_DISPOSITION: &str = "response-content-disposition";

/// S3-compatible storage client
pub struct S3StorageClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    path_style: bool,
}

impl S3StorageClient {
    /// Create a new client from configuration.
    ///
    /// No network call is made here; see [`S3StorageClient::ensure_bucket_exists`].
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("Failed to create S3 credentials: {}", e)))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Backend(format!("Invalid AWS region: {}", e)))?,
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| StorageError::Backend(format!("Failed to create S3 bucket handle: {}", e)))?;

        // Custom endpoints (MinIO) are addressed as http://endpoint/bucket
        let path_style = config.endpoint.is_some();
        if path_style {
            bucket.set_path_style();
        }

        info!(
            "S3 client initialized for bucket: {}, region: {}, endpoint: {}",
            bucket.name(),
            config.region,
            config.endpoint.as_deref().unwrap_or("aws")
        );

        Ok(Self {
            bucket,
            region,
            credentials,
            path_style,
        })
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), StorageError> {
        let name = self.bucket.name();
        let bucket_config = BucketConfiguration::default();

        let result = if self.path_style {
            Bucket::create_with_path_style(
                &name,
                self.region.clone(),
                self.credentials.clone(),
                bucket_config,
            )
            .await
        } else {
            Bucket::create(
                &name,
                self.region.clone(),
                self.credentials.clone(),
                bucket_config,
            )
            .await
        };

        match result {
            Ok(_) => {
                info!("Bucket '{}' created successfully", name);
                Ok(())
            }
            Err(e) if is_bucket_already_present(&e.to_string()) => {
                debug!("Bucket '{}' already exists", name);
                Ok(())
            }
            Err(e) => {
                warn!("Could not create bucket '{}': {}", name, e);
                Err(StorageError::Backend(format!(
                    "create bucket '{}': {}",
                    name, e
                )))
            }
        }
    }

    /// Get the bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

/// Whether a create-bucket failure only means the bucket is already there
fn is_bucket_already_present(error: &str) -> bool {
    error.contains("BucketAlreadyOwnedByYou")
        || error.contains("BucketAlreadyExists")
        || error.contains("already own it")
}

#[async_trait]
impl ObjectStorage for S3StorageClient {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        let size = data.len();

        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("'{}': {}", key, e)))?;

        debug!(
            "Uploaded object '{}' ({} bytes, {}) to bucket '{}'",
            key,
            size,
            content_type,
            self.bucket.name()
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        let (head, _) = self
            .bucket
            .head_object(key)
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("'{}': {}", key, e)))?;

        let response = self
            .bucket
            .get_object_stream(key)
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("'{}': {}", key, e)))?;

        debug!(
            "Streaming object '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );

        let body = response
            .bytes
            .map_err(|e| StorageError::DownloadFailed(e.to_string()));

        Ok(StoredObject {
            content_type: head.content_type,
            content_length: head.content_length.and_then(|len| u64::try_from(len).ok()),
            body: Box::pin(body),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("'{}': {}", key, e)))?;

        debug!("Deleted object '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn presign_get(
        &self,
        key: &str,
        expiry_secs: u32,
        content_disposition: Option<&str>,
    ) -> Result<String, StorageError> {
        let custom_queries = content_disposition.map(|disposition| {
            HashMap::from([(
                RESPONSE_CONTENT_DISPOSITION.to_string(),
                disposition.to_string(),
            )])
        });

        self.bucket
            .presign_get(key, expiry_secs, custom_queries)
            .await
            .map_err(|e| StorageError::PresignFailed(format!("'{}': {}", key, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minio_config() -> StorageConfig {
        StorageConfig {
            region: "us-east-1".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket: "images".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            create_bucket: false,
        }
    }

    #[test]
    fn test_new_uses_configured_bucket() {
        let client = S3StorageClient::new(minio_config()).unwrap();
        assert_eq!(client.bucket_name(), "images");
        assert!(client.path_style);
    }

    #[test]
    fn test_bucket_already_present_detection() {
        assert!(is_bucket_already_present(
            "Got HTTP 409 with content '<Code>BucketAlreadyOwnedByYou</Code>'"
        ));
        assert!(is_bucket_already_present("<Code>BucketAlreadyExists</Code>"));
        assert!(!is_bucket_already_present(
            "Got HTTP 403 with content '<Code>AccessDenied</Code>'"
        ));
    }

    #[tokio::test]
    async fn test_presign_get_carries_expiry_and_disposition() {
        let client = S3StorageClient::new(minio_config()).unwrap();

        let url = client
            .presign_get(
                "1700000000000-ab12cd34-cat.png",
                3600,
                Some("attachment; filename=\"cat.png\""),
            )
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:9000/images/1700000000000-ab12cd34-cat.png"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("response-content-disposition="));
        assert!(url.contains("cat.png"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_presign_get_without_disposition() {
        let client = S3StorageClient::new(minio_config()).unwrap();

        let url = client.presign_get("plain.png", 60, None).await.unwrap();

        assert!(url.contains("X-Amz-Expires=60"));
        assert!(!url.contains("response-content-disposition"));
    }
}
