//! In-memory stand-ins for the object store and metadata store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::Router;
use chrono::Utc;
use uuid::Uuid;

use crate::features::images::models::{Image, NewImage};
use crate::features::images::repositories::{ImageRepository, RepositoryError};
use crate::features::images::{routes, RetrievalService, UploadService};
use crate::modules::storage::{ObjectStorage, StorageError, StoredObject};

/// A recorded presign request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignCall {
    pub key: String,
    pub expiry_secs: u32,
    pub content_disposition: Option<String>,
}

#[derive(Default)]
pub struct InMemoryObjectStorage {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    presign_calls: Mutex<Vec<PresignCall>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    pub fail_put: AtomicBool,
    pub fail_get: AtomicBool,
    pub fail_presign: AtomicBool,
}

impl InMemoryObjectStorage {
    pub fn object(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn presign_calls(&self) -> Vec<PresignCall> {
        self.presign_calls.lock().unwrap().clone()
    }

    pub fn insert(&self, key: &str, data: &'static [u8], content_type: &str) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            (Bytes::from_static(data), content_type.to_string()),
        );
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("bucket unavailable".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StorageError::DownloadFailed("connection reset".to_string()));
        }
        let (data, content_type) = self
            .object(key)
            .ok_or_else(|| StorageError::DownloadFailed(format!("'{}': NoSuchKey", key)))?;

        let content_length = Some(data.len() as u64);
        Ok(StoredObject {
            content_type: Some(content_type),
            content_length,
            body: Box::pin(futures::stream::iter(vec![Ok(data)])),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presign_get(
        &self,
        key: &str,
        expiry_secs: u32,
        content_disposition: Option<&str>,
    ) -> Result<String, StorageError> {
        self.presign_calls.lock().unwrap().push(PresignCall {
            key: key.to_string(),
            expiry_secs,
            content_disposition: content_disposition.map(str::to_string),
        });
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(StorageError::PresignFailed("invalid credentials".to_string()));
        }
        Ok(format!(
            "https://storage.test/{}?X-Amz-Expires={}",
            key, expiry_secs
        ))
    }
}

#[derive(Default)]
pub struct InMemoryImageRepository {
    images: Mutex<Vec<Image>>,
    pub fail_create: AtomicBool,
}

impl InMemoryImageRepository {
    pub fn record_count(&self) -> usize {
        self.images.lock().unwrap().len()
    }

    pub fn seed(&self, image: Image) {
        self.images.lock().unwrap().push(image);
    }
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn create(&self, image: NewImage) -> Result<Image, RepositoryError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut images = self.images.lock().unwrap();
        if images.iter().any(|i| i.filename == image.filename) {
            return Err(RepositoryError::DuplicateFilename(image.filename));
        }
        let created = Image {
            id: Uuid::now_v7(),
            filename: image.filename,
            original_name: image.original_name,
            mime_type: image.mime_type,
            size: image.size,
            upload_date: Utc::now(),
            storage_key: image.storage_key,
        };
        images.push(created.clone());
        Ok(created)
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<Image>, RepositoryError> {
        Ok(self
            .images
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.filename == filename)
            .cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<Image>, RepositoryError> {
        let mut images = self.images.lock().unwrap().clone();
        images.sort_by(|a, b| b.upload_date.cmp(&a.upload_date).then(b.id.cmp(&a.id)));
        Ok(images)
    }
}

/// Fakes wired into the images router
pub struct TestContext {
    pub storage: Arc<InMemoryObjectStorage>,
    pub repository: Arc<InMemoryImageRepository>,
    pub upload_service: Arc<UploadService>,
    pub retrieval_service: Arc<RetrievalService>,
}

impl TestContext {
    pub fn new() -> Self {
        let storage = Arc::new(InMemoryObjectStorage::default());
        let repository = Arc::new(InMemoryImageRepository::default());
        let upload_service = Arc::new(UploadService::new(
            storage.clone(),
            repository.clone(),
        ));
        let retrieval_service = Arc::new(RetrievalService::new(
            storage.clone(),
            repository.clone(),
        ));
        Self {
            storage,
            repository,
            upload_service,
            retrieval_service,
        }
    }

    pub fn router(&self) -> Router {
        routes(
            Arc::clone(&self.upload_service),
            Arc::clone(&self.retrieval_service),
            1024 * 1024,
        )
    }
}
