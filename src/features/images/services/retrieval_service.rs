use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::images::dtos::{ImageResponseDto, ImageWithUrlDto};
use crate::features::images::models::Image;
use crate::features::images::repositories::ImageRepository;
use crate::modules::storage::{ByteStream, ObjectStorage, StorageError};
use crate::shared::constants::{DEFAULT_CONTENT_TYPE, SIGNED_URL_EXPIRY_SECS};

const RETRIEVE_ERROR: &str = "Error retrieving file";
const DOWNLOAD_ERROR: &str = "Error downloading from storage";
const LIST_ERROR: &str = "Error retrieving files";

/// An image body ready to be streamed to the client
pub struct ImageDownload {
    pub content_type: String,
    pub content_disposition: String,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl std::fmt::Debug for ImageDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageDownload")
            .field("content_type", &self.content_type)
            .field("content_disposition", &self.content_disposition)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Resolves image records to presigned URLs or streamed bodies
pub struct RetrievalService {
    storage: Arc<dyn ObjectStorage>,
    repository: Arc<dyn ImageRepository>,
}

impl RetrievalService {
    pub fn new(storage: Arc<dyn ObjectStorage>, repository: Arc<dyn ImageRepository>) -> Self {
        Self {
            storage,
            repository,
        }
    }

    async fn find_image(&self, filename: &str) -> Result<Image> {
        self.repository
            .find_by_filename(filename)
            .await
            .map_err(|e| AppError::upstream(RETRIEVE_ERROR, e))?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    async fn presigned_url(&self, image: &Image) -> std::result::Result<String, StorageError> {
        let disposition = attachment_disposition(&image.original_name);
        self.storage
            .presign_get(&image.storage_key, SIGNED_URL_EXPIRY_SECS, Some(&disposition))
            .await
    }

    /// Presigned one-hour URL for an image, served as an attachment
    pub async fn signed_url(&self, filename: &str) -> Result<String> {
        let image = self.find_image(filename).await?;

        let url = self
            .presigned_url(&image)
            .await
            .map_err(|e| AppError::upstream(RETRIEVE_ERROR, e))?;

        debug!("Presigned URL generated for '{}'", image.storage_key);
        Ok(url)
    }

    /// Fetch an image body from storage for streaming through the service
    pub async fn download(&self, filename: &str) -> Result<ImageDownload> {
        let image = self.find_image(filename).await?;

        let object = self
            .storage
            .get(&image.storage_key)
            .await
            .map_err(|e| AppError::upstream(DOWNLOAD_ERROR, e))?;

        let content_type = object
            .content_type
            .filter(|ct| !ct.is_empty())
            .or_else(|| Some(image.mime_type.clone()).filter(|ct| !ct.is_empty()))
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Ok(ImageDownload {
            content_type,
            content_disposition: attachment_disposition(&image.original_name),
            content_length: object.content_length,
            body: object.body,
        })
    }

    /// All images, newest first, each with a presigned URL.
    ///
    /// URLs are requested concurrently; any failure fails the whole listing.
    pub async fn list_with_urls(&self) -> Result<Vec<ImageWithUrlDto>> {
        let images = self
            .repository
            .list_newest_first()
            .await
            .map_err(|e| AppError::upstream(LIST_ERROR, e))?;

        let urls = try_join_all(images.iter().map(|image| self.presigned_url(image)))
            .await
            .map_err(|e| AppError::upstream(LIST_ERROR, e))?;

        debug!("Listed {} images with presigned URLs", images.len());

        Ok(images
            .into_iter()
            .zip(urls)
            .map(|(image, url)| ImageWithUrlDto {
                image: ImageResponseDto::from(image),
                url,
            })
            .collect())
    }
}

/// `Content-Disposition` value marking the response as a download
pub fn attachment_disposition(original_name: &str) -> String {
    let escaped: String = original_name
        .chars()
        .filter(|c| !c.is_control())
        .flat_map(|c| match c {
            '"' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect();
    format!("attachment; filename=\"{}\"", escaped)
}
