use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::images::models::Image;

/// Upload request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadImageDto {
    /// The image to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}

/// Metadata record of an uploaded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImageResponseDto {
    pub id: Uuid,
    /// Generated storage key, also the lookup identifier
    #[schema(example = "1700000000000-ab12cd34-cat.png")]
    pub filename: String,
    /// Filename as sent by the client
    #[serde(rename = "originalname")]
    #[schema(example = "cat.png")]
    pub original_name: String,
    /// Content type declared by the client
    #[serde(rename = "mimetype")]
    #[schema(example = "image/png")]
    pub mime_type: String,
    /// Size in bytes
    pub size: i64,
    #[serde(rename = "uploadDate")]
    pub upload_date: DateTime<Utc>,
    #[serde(rename = "storageKey")]
    pub storage_key: String,
}

impl From<Image> for ImageResponseDto {
    fn from(image: Image) -> Self {
        Self {
            id: image.id,
            filename: image.filename,
            original_name: image.original_name,
            mime_type: image.mime_type,
            size: image.size,
            upload_date: image.upload_date,
            storage_key: image.storage_key,
        }
    }
}

/// Response of a successful upload
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponseDto {
    #[schema(example = "File uploaded successfully")]
    pub message: String,
    pub file: ImageResponseDto,
}

/// Image record together with a presigned download URL
#[derive(Debug, Serialize, ToSchema)]
pub struct ImageWithUrlDto {
    #[serde(flatten)]
    pub image: ImageResponseDto,
    /// Presigned URL, valid for one hour
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> ImageResponseDto {
        ImageResponseDto {
            id: Uuid::nil(),
            filename: "1700000000000-ab12cd34-cat.png".to_string(),
            original_name: "cat.png".to_string(),
            mime_type: "image/png".to_string(),
            size: 10,
            upload_date: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            storage_key: "1700000000000-ab12cd34-cat.png".to_string(),
        }
    }

    #[test]
    fn test_image_response_field_names() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["originalname"], "cat.png");
        assert_eq!(value["mimetype"], "image/png");
        assert_eq!(value["size"], 10);
        assert_eq!(value["storageKey"], value["filename"]);
        assert!(value.get("uploadDate").is_some());
        assert!(value.get("original_name").is_none());
    }

    #[test]
    fn test_image_with_url_is_flattened() {
        let dto = ImageWithUrlDto {
            image: sample(),
            url: "https://example.test/signed".to_string(),
        };
        let value = serde_json::to_value(dto).unwrap();

        assert_eq!(value["url"], "https://example.test/signed");
        assert_eq!(value["filename"], "1700000000000-ab12cd34-cat.png");
        assert!(value.get("image").is_none());
    }
}
