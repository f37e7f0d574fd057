use std::sync::Arc;

use axum::body::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::images::dtos::ImageResponseDto;
use crate::features::images::models::NewImage;
use crate::features::images::repositories::ImageRepository;
use crate::modules::storage::ObjectStorage;

const UPLOAD_ERROR: &str = "Error uploading file";

/// Stores image payloads and records their metadata
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    repository: Arc<dyn ImageRepository>,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, repository: Arc<dyn ImageRepository>) -> Self {
        Self {
            storage,
            repository,
        }
    }

    /// Upload an image to object storage, then save its metadata
    ///
    /// The object is written first; the metadata record is only created once
    /// the store accepted the bytes. If the metadata write fails the object is
    /// deleted again on a best-effort basis.
    pub async fn upload_image(
        &self,
        data: Bytes,
        original_name: &str,
        content_type: &str,
    ) -> Result<ImageResponseDto> {
        let size = data.len() as i64;
        let key = generate_storage_key(Utc::now().timestamp_millis(), original_name);

        self.storage
            .put(&key, data, content_type)
            .await
            .map_err(|e| AppError::upstream(UPLOAD_ERROR, e))?;

        debug!("Image stored: key={}, size={}", key, size);

        let new_image = NewImage {
            filename: key.clone(),
            original_name: original_name.to_string(),
            mime_type: content_type.to_string(),
            size,
            storage_key: key.clone(),
        };

        let image = match self.repository.create(new_image).await {
            Ok(image) => image,
            Err(e) => {
                if let Err(delete_err) = self.storage.delete(&key).await {
                    warn!(
                        "Failed to remove object '{}' after metadata write failed: {}",
                        key, delete_err
                    );
                }
                return Err(AppError::upstream(UPLOAD_ERROR, e));
            }
        };

        info!(
            "Image uploaded: id={}, filename={}, mimetype={}, size={}",
            image.id, image.filename, image.mime_type, image.size
        );

        Ok(image.into())
    }
}

/// Build a storage key of the form `<millis>-<random>-<name>`.
///
/// Path separators in the client-supplied name are replaced so the key stays
/// a single path segment.
fn generate_storage_key(timestamp_millis: i64, original_name: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    let safe_name: String = original_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}-{}-{}", timestamp_millis, &nonce[..8], safe_name)
}
