//! Object storage abstraction
//!
//! The upload and retrieval services talk to the object store only through
//! [`ObjectStorage`], so the S3 client can be swapped for an in-memory fake
//! in tests.

use std::pin::Pin;

use async_trait::async_trait;
use axum::body::Bytes;
use futures::Stream;
use thiserror::Error;

/// Object storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Stream of body chunks for an object being downloaded
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// An object fetched from storage, body not yet consumed
pub struct StoredObject {
    /// Content type reported by the object store
    pub content_type: Option<String>,
    /// Content length reported by the object store
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl std::fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredObject")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Binary object store used for image payloads
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key`, tagging the object with `content_type`
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// Fetch an object for streaming
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// Remove an object
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Generate a time-limited GET URL.
    ///
    /// `content_disposition`, when given, is signed into the URL as the
    /// `response-content-disposition` override.
    async fn presign_get(
        &self,
        key: &str,
        expiry_secs: u32,
        content_disposition: Option<&str>,
    ) -> Result<String, StorageError>;
}
